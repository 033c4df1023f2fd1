use crate::error::AppError;
use crate::models::chat::{ChatMessage, ChatRole};
use crate::upstream::{GenerationClient, GenerationTurn};
use log::info;
use std::sync::Arc;
use uuid::Uuid;

/// Persona instruction prepended to every outbound generation request.
/// Kept verbatim from the production prompt, including its "exactly 5"
/// wording alongside six listed categories.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert agricultural advisor. Provide farming advice in exactly 5 short bullet points.\n\nFormat each response with these 5 categories:\n1. Precautions when handling\n2. Treatment for infected leaves\n3. Safe pesticides to use\n4. Organic treatment alternatives\n5. Future prevention methods\n6. Fertilizers + irrigation advice\n\nKeep each point to one sentence only. Be specific and practical.";

/// Fallback bullet when the provider answers with nothing usable. Callers
/// treat an empty list as ambiguous, so this is never `[]`.
pub const NO_RESPONSE_BULLET: &str = "No response received";

const BULLET_GLYPHS: [char; 9] = ['-', '•', '*', '➤', '▪', '▫', '◦', '‣', '⁃'];

/// Chat relay: persona + transcript in, cleaned bullet list out.
pub struct Advisor {
    client: Arc<dyn GenerationClient>,
}

impl Advisor {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// Forwards the transcript to the generation provider and reformats
    /// the reply. Exactly one outbound call; upstream failure propagates
    /// as an upstream error for the handler to shape.
    pub async fn relay(&self, messages: &[ChatMessage]) -> Result<Vec<String>, AppError> {
        let request_id = Uuid::new_v4();
        let turns = build_turns(messages);
        info!(
            "chat relay {}: {} transcript message(s), {} forwarded turn(s)",
            request_id,
            messages.len(),
            turns.len()
        );

        let text = self.client.generate(&turns).await?;
        Ok(format_as_bullets(&text))
    }
}

/// Maps the transcript onto the provider's role convention: the persona
/// instruction leads as a user turn, then every text-bearing message
/// follows, assistant turns tagged as `model`. Bullet-only assistant
/// replies carry no free text and are skipped.
pub fn build_turns(messages: &[ChatMessage]) -> Vec<GenerationTurn> {
    let mut turns = vec![GenerationTurn::user(SYSTEM_INSTRUCTION)];

    for message in messages {
        let Some(text) = message.text.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        turns.push(match message.role {
            ChatRole::Assistant => GenerationTurn::model(text),
            ChatRole::User => GenerationTurn::user(text),
        });
    }

    turns
}

/// Splits generated text into trimmed non-empty lines and strips the common
/// bullet/numbering prefixes from each.
pub fn format_as_bullets(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![NO_RESPONSE_BULLET.to_string()];
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(strip_bullet_prefix)
        .collect()
}

/// Prefix stripping mirrors the relay's cleanup chain: one bullet glyph,
/// then `1.`-style numbering, then `a.`-style lettering, then a leftover
/// `* ` - applied in that order on the same line.
fn strip_bullet_prefix(line: &str) -> String {
    let mut s = line.trim();

    if let Some(rest) = s.strip_prefix(&BULLET_GLYPHS[..]) {
        s = rest.trim_start();
    }

    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && s[digits..].starts_with('.') {
        s = s[digits + 1..].trim_start();
    }

    let mut chars = s.chars();
    if let (Some(first), Some('.')) = (chars.next(), chars.next()) {
        if first.is_ascii_alphabetic() {
            s = s[2..].trim_start();
        }
    }

    if let Some(rest) = s.strip_prefix('*') {
        if rest.starts_with(char::is_whitespace) {
            s = rest.trim_start();
        }
    }

    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::ChatMessage;
    use crate::upstream::TurnRole;
    use async_trait::async_trait;

    struct CannedGeneration(String);

    #[async_trait]
    impl GenerationClient for CannedGeneration {
        async fn generate(&self, _turns: &[GenerationTurn]) -> Result<String, AppError> {
            Ok(self.0.clone())
        }
    }

    struct FailingGeneration;

    #[async_trait]
    impl GenerationClient for FailingGeneration {
        async fn generate(&self, _turns: &[GenerationTurn]) -> Result<String, AppError> {
            Err(AppError::upstream(Some(500), "quota exceeded"))
        }
    }

    #[test]
    fn strips_dash_number_and_asterisk_prefixes() {
        let text = "- Apply copper spray\n1. Avoid overhead water\n* Remove debris";
        assert_eq!(
            format_as_bullets(text),
            vec![
                "Apply copper spray".to_string(),
                "Avoid overhead water".to_string(),
                "Remove debris".to_string(),
            ]
        );
    }

    #[test]
    fn strips_unicode_glyphs_and_letter_numbering() {
        assert_eq!(format_as_bullets("• Rotate crops"), vec!["Rotate crops"]);
        assert_eq!(format_as_bullets("‣ Mulch beds"), vec!["Mulch beds"]);
        assert_eq!(format_as_bullets("a. Water at dawn"), vec!["Water at dawn"]);
        assert_eq!(format_as_bullets("12. Test soil pH"), vec!["Test soil pH"]);
    }

    #[test]
    fn stacked_prefixes_strip_in_sequence() {
        assert_eq!(format_as_bullets("- 1. Prune suckers"), vec!["Prune suckers"]);
        assert_eq!(format_as_bullets("** Scout weekly"), vec!["Scout weekly"]);
    }

    #[test]
    fn empty_text_yields_fallback_bullet_never_empty_list() {
        assert_eq!(format_as_bullets(""), vec![NO_RESPONSE_BULLET.to_string()]);
        assert_eq!(
            format_as_bullets("   \n\t  "),
            vec![NO_RESPONSE_BULLET.to_string()]
        );
    }

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(
            format_as_bullets("- Feed weekly\n\n\n- Stake vines"),
            vec!["Feed weekly".to_string(), "Stake vines".to_string()]
        );
    }

    #[test]
    fn turns_lead_with_persona_and_map_roles() {
        let messages = vec![
            ChatMessage::user("what about late blight?"),
            ChatMessage::assistant_text("Use certified seed."),
            ChatMessage::user("and organic options?"),
        ];

        let turns = build_turns(&messages);
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[0].text, SYSTEM_INSTRUCTION);
        assert_eq!(turns[2].role, TurnRole::Model);
        assert_eq!(turns[3].text, "and organic options?");
    }

    #[test]
    fn bullet_only_assistant_replies_are_not_forwarded() {
        let messages = vec![
            ChatMessage::user("first question"),
            ChatMessage::assistant_bullets(vec!["Spray neem oil".to_string()]),
            ChatMessage::user("second question"),
        ];

        let turns = build_turns(&messages);
        assert_eq!(turns.len(), 3);
        assert!(turns.iter().all(|t| t.text != "Spray neem oil"));
    }

    #[tokio::test]
    async fn relay_formats_provider_reply() {
        let advisor = Advisor::new(Arc::new(CannedGeneration(
            "- Wear gloves\n- Burn infected leaves".to_string(),
        )));
        let bullets = advisor.relay(&[ChatMessage::user("help")]).await.unwrap();
        assert_eq!(bullets, vec!["Wear gloves", "Burn infected leaves"]);
    }

    #[tokio::test]
    async fn relay_surfaces_upstream_failure() {
        let advisor = Advisor::new(Arc::new(FailingGeneration));
        let err = advisor.relay(&[ChatMessage::user("help")]).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { status: Some(500), .. }));
    }
}
