//! 上游依赖缺失时使用的占位文本
//!
//! 下游阶段不会因为上游失败而被阻塞，而是拿到一段以 `N/A` 开头、
//! 描述失败原因的占位文本继续生成。占位文本永远不为空。

pub const PLACEHOLDER_PREFIX: &str = "N/A";

/// 调用方没有提供理论文本时的默认值
pub const THEORY_NOT_GENERATED: &str = "N/A - background theory was not generated yet";

/// 调用方没有提供流程图时的默认值
pub const FLOWCHART_NOT_GENERATED: &str = "N/A - generate a flowchart first";

/// 理论阶段失败后交给流程图阶段的占位文本
pub fn missing_theory(reason: &str) -> String {
    format!(
        "{PLACEHOLDER_PREFIX} - the background theory could not be generated ({reason}). \
         Build the flowchart from the topic alone."
    )
}

/// 流程图阶段失败后交给测验阶段的占位文本
pub fn missing_flowchart(reason: &str) -> String {
    format!(
        "{PLACEHOLDER_PREFIX} - the concept flowchart could not be generated ({reason}). \
         Base the quiz on the topic alone."
    )
}

pub fn is_placeholder(text: &str) -> bool {
    text.trim_start().starts_with(PLACEHOLDER_PREFIX)
}
