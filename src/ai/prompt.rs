use crate::models::FileBatch;

/// 审查指令（固定策略文本，不属于本核心的正确性契约）
const REVIEW_PREAMBLE: &str = "你是一位世界级的全栈首席架构师，拥有超过15年的复杂系统设计经验。\n请对以下代码工程进行深度评审。";

const REVIEW_REQUIREMENTS: &str = "评审核心维度：\n\
1. **Java & Spring 生态**：检查依赖注入、事务一致性、并发安全、JVM 优化及 Spring Boot 最佳实践。\n\
2. **Vue.js & 前端工程化**：检查响应式开销、组件通信、内存泄露（事件监听未移除）、状态流管理。\n\
3. **安全漏洞**：识别 SQL 注入、跨站脚本、越权风险及硬编码密钥。\n\
4. **架构设计**：评估模块解耦、SOLID 原则及代码可维护性。\n\
\n\
输出要求：\n\
- 使用结构化 JSON 响应。\n\
- issues 中的 filename 必须精确匹配上传的文件名。\n\
- 所有描述和建议请使用中文，专业术语可保留英文。";

/// 聊天传输失败时的兜底回复
pub const CHAT_FALLBACK_REPLY: &str = "通信异常。";

/// 把批次内每个文件渲染为定界块，按插入顺序拼接成一个提示体
pub fn build_review_prompt(batch: &FileBatch) -> String {
    let project_context = batch
        .files()
        .iter()
        .map(|f| format!("--- FILE: {} ---\n{}", f.path, f.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\n项目背景与代码内容：\n{}\n\n{}",
        REVIEW_PREAMBLE, project_context, REVIEW_REQUIREMENTS
    )
}

/// 聊天系统上下文：只携带在审文件名列表，不回放历史
pub fn build_chat_system(file_names: &[String]) -> String {
    format!(
        "你是一位全栈专家助理，正在协助开发者评审名为 {} 的项目。\n请基于文件内容提供精准的技术指导。风格专业、高效、见解深刻。使用中文。",
        file_names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceFile;

    #[test]
    fn test_prompt_contains_delimited_sections_in_batch_order() {
        let batch: FileBatch = vec![
            SourceFile::new("a.java", "class A {}"),
            SourceFile::new("b.ts", "export const b = 1;"),
        ]
        .into();

        let prompt = build_review_prompt(&batch);
        let a_pos = prompt.find("--- FILE: a.java ---").expect("a.java section");
        let b_pos = prompt.find("--- FILE: b.ts ---").expect("b.ts section");
        assert!(a_pos < b_pos, "sections must follow insertion order");
        assert!(prompt.contains("class A {}"));
        assert!(prompt.contains("export const b = 1;"));
    }

    #[test]
    fn test_chat_system_lists_file_names() {
        let system = build_chat_system(&["a.java".to_string(), "b.ts".to_string()]);
        assert!(system.contains("a.java, b.ts"));
    }
}
