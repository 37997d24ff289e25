//! Prompts for the welcome email drafter and the HR chat assistant.

use super::drafter::WelcomeFields;

/// System prompt for welcome email generation.
pub const WELCOME_SYSTEM_PROMPT: &str = "You are HR Ops helping write friendly welcome emails.";

/// System prompt for chat mode.
pub const CHAT_SYSTEM_PROMPT: &str =
    "You are an HR Tech assistant. Keep responses friendly and chill.";

/// Build the user prompt asking for an HTML welcome email.
pub fn welcome_email_prompt(fields: &WelcomeFields, company: &str) -> String {
    format!(
        "\
Write a warm, welcoming HTML email for a new {role} joining the {team} team at {company}.

Requirements:
- Output only raw HTML. No triple backticks, no markdown, nothing outside the HTML structure.
- Use inline CSS so it renders consistently across email clients.
- Use subtle brand colors: primary accent #FF3621, secondary #1B3139, background #F9F7F4.
- Use clean sans-serif typography with comfortable spacing.
- Include:
  - A friendly greeting with {name}
  - A short paragraph welcoming them to the team
  - A section about what their first week will look like
  - A note that onboarding tasks will arrive soon in the task tracker
  - Contact info for their manager: {manager}
  - A sign-off from HR
- Keep it mobile-friendly, modern and readable. No heavy graphics.

Personalization fields:
- Name: {name}
- Role: {role}
- Team: {team}
- Start Date: {start_date}
- Manager Email: {manager}
- Location: {location}

Return only the HTML body, no code fences, no extra commentary.",
        name = fields.name,
        role = fields.role,
        team = fields.team,
        start_date = fields.start_date.format("%Y-%m-%d"),
        manager = fields.manager_email,
        location = fields.location,
    )
}

/// Trim whitespace and remove a surrounding markdown code fence, if present.
///
/// Models sometimes wrap the HTML in a fenced block despite being told not to.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // Drop the info string (e.g. "html") on the opening fence line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}
