use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{GenerationError, GenerationOutcome};

/// 单个阶段的结果
///
/// 要么是完整且通过校验的载荷，要么是完整的失败，不存在部分成功
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult<T> {
    Succeeded(T),
    Failed(GenerationError),
}

impl<T> GenerationResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, GenerationResult::Succeeded(_))
    }

    pub fn is_failed(&self) -> bool {
        !self.is_ok()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            GenerationResult::Succeeded(value) => Some(value),
            GenerationResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&GenerationError> {
        match self {
            GenerationResult::Succeeded(_) => None,
            GenerationResult::Failed(err) => Some(err),
        }
    }

    pub fn into_outcome(self) -> GenerationOutcome<T> {
        match self {
            GenerationResult::Succeeded(value) => Ok(value),
            GenerationResult::Failed(err) => Err(err),
        }
    }
}

impl<T> From<GenerationOutcome<T>> for GenerationResult<T> {
    fn from(outcome: GenerationOutcome<T>) -> Self {
        match outcome {
            Ok(value) => GenerationResult::Succeeded(value),
            Err(err) => GenerationResult::Failed(err),
        }
    }
}

/// 序列化为 `{"ok": true, "value": ...}` 或 `{"ok": false, "error": {...}}`
impl<T: Serialize> Serialize for GenerationResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GenerationResult", 2)?;
        match self {
            GenerationResult::Succeeded(value) => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("value", value)?;
            }
            GenerationResult::Failed(err) => {
                state.serialize_field("ok", &false)?;
                state.serialize_field(
                    "error",
                    &serde_json::json!({
                        "kind": err.kind(),
                        "message": err.to_string(),
                    }),
                )?;
            }
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TheoryPayload;

    #[test]
    fn test_serialize_success() {
        let result = GenerationResult::Succeeded(TheoryPayload {
            theory: "Big O bounds growth.".into(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["value"]["theory"], "Big O bounds growth.");
    }

    #[test]
    fn test_serialize_failure() {
        let result: GenerationResult<TheoryPayload> =
            GenerationResult::Failed(GenerationError::transport("theory", "timed out"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["kind"], "transport");
        assert!(json.get("value").is_none());
    }

    #[test]
    fn test_from_outcome() {
        let ok: GenerationResult<u8> = Ok(1).into();
        assert_eq!(ok.value(), Some(&1));
        let failed: GenerationResult<u8> =
            Err(GenerationError::input_precondition("theory", "topic")).into();
        assert!(failed.is_failed());
    }
}
