//! 模型响应解析
//!
//! 模型经常在 JSON 外面包一层 Markdown 代码块，或者在前后附带说明文字。
//! 这里负责把 JSON 对象抠出来、反序列化，再做结构校验。

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{GenerationError, GenerationOutcome};
use crate::models::Validate;
use crate::utils::truncate_text;

static FENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("fence pattern is a valid regex")
});

/// 从原始响应中找出可能的 JSON 文本
///
/// 依次为：原文 → 包裹整个响应的代码块内容 → 最外层 `{ ... }`
pub fn json_candidates(raw: &str) -> Vec<&str> {
    let raw = raw.trim();
    let mut candidates = vec![raw];

    if let Some(inner) = FENCE_PATTERN.captures(raw).and_then(|caps| caps.get(1)) {
        // 代码块必须出现在第一个 `{` 之前，否则它只是 JSON 字符串里的内容
        let fence_first = raw
            .find('{')
            .map_or(true, |brace| inner.start() <= brace);
        if fence_first {
            candidates.push(inner.as_str());
        }
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            candidates.push(&raw[start..=end]);
        }
    }

    candidates.dedup();
    candidates
}

/// 解析并校验模型响应
///
/// 任何失败都归类为 `SchemaValidation`
pub fn parse_response<T>(task: &'static str, raw: &str) -> GenerationOutcome<T>
where
    T: DeserializeOwned + Validate,
{
    let mut last_error = String::from("empty response");
    let mut payload = None;

    for candidate in json_candidates(raw) {
        match serde_json::from_str::<T>(candidate) {
            Ok(parsed) => {
                payload = Some(parsed);
                break;
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    let payload = payload.ok_or_else(|| {
        debug!("[{}] 无法解析的响应: {}", task, truncate_text(raw, 200));
        GenerationError::schema_validation(task, format!("invalid JSON: {last_error}"))
    })?;

    payload
        .validate()
        .map_err(|message| GenerationError::schema_validation(task, message))?;

    Ok(payload)
}
