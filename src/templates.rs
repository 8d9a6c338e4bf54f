pub const ANALYZE_PROMPT_MD: &str = include_str!("../prompts/analyze.md");
pub const PLAN_PROMPT_MD: &str = include_str!("../prompts/plan.md");
pub const START_PROMPT_MD: &str = include_str!("../prompts/start.md");

const SECTION_BREAK: &str = "\n\n---\n\n";

pub fn analyze_prompt(project: &str, context: &str) -> String {
    format!(
        "{}{SECTION_BREAK}Source code of project \"{project}\":\n\n{context}",
        ANALYZE_PROMPT_MD.trim_end()
    )
}

pub fn plan_prompt(project: &str, analysis_report: &str) -> String {
    format!(
        "{}{SECTION_BREAK}Analysis report for project \"{project}\":\n\n{analysis_report}",
        PLAN_PROMPT_MD.trim_end()
    )
}

pub fn start_prompt(
    project: &str,
    migration_plan: &str,
    progress_json: Option<&str>,
    instruction: Option<&str>,
) -> String {
    let mut prompt = format!(
        "{}{SECTION_BREAK}Migration plan for project \"{project}\":\n\n{migration_plan}",
        START_PROMPT_MD.trim_end()
    );
    if let Some(progress) = progress_json {
        prompt.push_str(SECTION_BREAK);
        prompt.push_str("Current migration progress:\n```json\n");
        prompt.push_str(progress.trim_end());
        prompt.push_str("\n```");
    }
    if let Some(instruction) = instruction.map(str::trim).filter(|text| !text.is_empty()) {
        prompt.push_str("\n\nAdditional instruction from the user: ");
        prompt.push_str(instruction);
    }
    prompt
}
