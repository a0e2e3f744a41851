//! Persona context resolution.

use lens_core::{PersonaCatalog, PersonaContext};

/// Joins a persona's base instruction to its sub-option instruction.
pub const FOCUS_DELIMITER: &str = "\n\nSpecific focus: ";

/// Compose the instruction fragment for a persona selection.
///
/// Returns `None` (unconditioned analysis) when either id is unset or not in
/// the catalog.
#[must_use]
pub fn resolve_context(
    catalog: &PersonaCatalog,
    persona_id: Option<&str>,
    sub_option_id: Option<&str>,
) -> Option<PersonaContext> {
    let persona_id = persona_id?;
    let sub_option_id = sub_option_id?;
    let persona = catalog.persona(persona_id)?;
    let sub_option = persona.sub_options.get(sub_option_id)?;

    Some(PersonaContext {
        persona_id: persona_id.to_string(),
        sub_option_id: sub_option_id.to_string(),
        instruction_fragment: format!(
            "{}{FOCUS_DELIMITER}{}",
            persona.base_instruction, sub_option.instruction
        ),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn catalog() -> PersonaCatalog {
        PersonaCatalog::from_toml_str(
            r#"
[personas.diabetes]
label = "Diabetes"
base_instruction = "Assess for a diabetic shopper."

[personas.diabetes.sub_options.type2]
label = "Type 2"
instruction = "Weigh added sugars and refined starch."
"#,
        )
        .unwrap()
    }

    #[test]
    fn composes_base_and_sub_option() {
        let context = resolve_context(&catalog(), Some("diabetes"), Some("type2")).unwrap();
        assert_eq!(context.persona_id, "diabetes");
        assert_eq!(context.sub_option_id, "type2");
        assert_eq!(
            context.instruction_fragment,
            "Assess for a diabetic shopper.\n\nSpecific focus: Weigh added sugars and refined starch."
        );
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("diabetes"), None)]
    #[case(None, Some("type2"))]
    #[case(Some("keto"), Some("type2"))]
    #[case(Some("diabetes"), Some("type1"))]
    fn unset_or_unknown_ids_mean_no_context(
        #[case] persona: Option<&str>,
        #[case] sub_option: Option<&str>,
    ) {
        assert!(resolve_context(&catalog(), persona, sub_option).is_none());
    }

    #[test]
    fn equal_selections_compare_equal() {
        let a = resolve_context(&catalog(), Some("diabetes"), Some("type2"));
        let b = resolve_context(&catalog(), Some("diabetes"), Some("type2"));
        assert_eq!(a, b);
    }
}
