//! Persona templates for the assistant. Each persona maps to one fixed
//! instruction block; the grounding context and a closing language
//! instruction are spliced around it.

use serde::{Deserialize, Serialize};

/// The assistant's role for a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "persona", rename_all = "snake_case")]
pub enum Persona {
    Doctor,
    Mom,
    Nutritionist,
}

impl Persona {
    /// Parses a selector string. Anything unrecognized falls back to
    /// `Mom` — the documented default persona, not an error.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s {
            Some("doctor") => Persona::Doctor,
            Some("nutritionist") => Persona::Nutritionist,
            _ => Persona::Mom,
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Persona::Doctor => DOCTOR_TEMPLATE,
            Persona::Mom => MOM_TEMPLATE,
            Persona::Nutritionist => NUTRITIONIST_TEMPLATE,
        }
    }
}

const DOCTOR_TEMPLATE: &str = "\
You are a pediatrician AI assistant.
- Answer questions about the child's health knowledgeably and kindly.
- Offer general information and advice about symptoms.
- For serious symptoms or emergencies, always advise visiting a hospital.
- Never give a medical diagnosis or prescription; provide general health information only.";

const MOM_TEMPLATE: &str = "\
You are an experienced parenting expert AI assistant.
- Answer all kinds of parenting questions with warmth and empathy.
- Offer advice appropriate to the child's developmental stage.
- Understand the parent's worries and give practical help.
- Also advise on managing parenting stress.";

const NUTRITIONIST_TEMPLATE: &str = "\
You are a pediatric nutrition expert AI assistant.
- Answer questions about the child's nutrition and diet knowledgeably.
- Suggest age-appropriate nutritional intake and meal plans.
- Advise on picky eating, allergies and weaning food.
- Share tips for building healthy eating habits.";

const CONTEXT_HEADER: &str = "[Child information]";

const CLOSING_INSTRUCTION: &str = "\
Reply in the same language the user writes in, in a friendly tone and \
with explanations that are easy to understand.";

/// Builds the full system instruction for one chat turn. The context
/// section is only emitted when a context blob is supplied.
pub fn system_prompt(persona: Persona, kid_context: Option<&str>) -> String {
    let mut prompt = persona.template().to_string();

    if let Some(context) = kid_context {
        prompt.push_str("\n\n");
        prompt.push_str(CONTEXT_HEADER);
        prompt.push('\n');
        prompt.push_str(context);
    }

    prompt.push_str("\n\n");
    prompt.push_str(CLOSING_INSTRUCTION);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_selector_falls_back_to_mom() {
        assert_eq!(Persona::parse_or_default(Some("astronaut")), Persona::Mom);
        assert_eq!(Persona::parse_or_default(None), Persona::Mom);
        assert_eq!(Persona::parse_or_default(Some("doctor")), Persona::Doctor);
        assert_eq!(
            Persona::parse_or_default(Some("nutritionist")),
            Persona::Nutritionist
        );
    }

    #[test]
    fn test_context_blob_is_appended_under_header() {
        let prompt = system_prompt(Persona::Doctor, Some("- Name: Alice"));
        assert!(prompt.contains("[Child information]\n- Name: Alice"));
        assert!(prompt.starts_with("You are a pediatrician"));
    }

    #[test]
    fn test_no_context_section_without_blob() {
        let prompt = system_prompt(Persona::Mom, None);
        assert!(!prompt.contains("[Child information]"));
        assert!(prompt.ends_with(CLOSING_INSTRUCTION));
    }

    #[test]
    fn test_closing_instruction_always_present() {
        for persona in [Persona::Doctor, Persona::Mom, Persona::Nutritionist] {
            assert!(system_prompt(persona, None).contains(CLOSING_INSTRUCTION));
            assert!(system_prompt(persona, Some("ctx")).contains(CLOSING_INSTRUCTION));
        }
    }
}
