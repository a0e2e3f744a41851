//! Human-readable rendering of a verdict, with villain terms marked in every
//! free-text field.

use lens_core::AnalysisResult;
use lens_highlight::{Span, TermIndex};

use crate::cli::OutputFormat;
use crate::output::{render, table};

const MATCH_STYLE: &str = "1;31";

/// Render a verdict. JSON and raw formats emit the verdict object unchanged.
pub fn render_verdict(result: &AnalysisResult, format: OutputFormat) -> anyhow::Result<String> {
    if format != OutputFormat::Table {
        return render(result, format);
    }

    let options = super::table_options();
    let index = TermIndex::new(&result.villains)?;
    let mut sections = Vec::new();

    let mut overview = vec![
        vec!["healthScore".to_string(), result.health_score.to_string()],
        vec![
            "dietaryClassification".to_string(),
            result.dietary_classification.to_string(),
        ],
    ];
    if result.uncertainty.is_uncertain {
        overview.push(vec!["uncertain".to_string(), "warning".to_string()]);
    }
    sections.push(table::render_table(&["key", "value"], &overview, options));

    let text = result
        .free_text_fields()
        .into_iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(label, text)| format!("{label}: {}", render_spans(&index.spans(text), options.color)))
        .collect::<Vec<_>>();
    sections.push(text.join("\n"));

    let radar = result
        .radar_data
        .iter()
        .map(|point| vec![point.subject.clone(), point.value.to_string()])
        .collect::<Vec<_>>();
    sections.push(table::render_table(&["dimension", "score"], &radar, options));

    if !result.insights.is_empty() {
        let insights = result
            .insights
            .iter()
            .map(|insight| {
                vec![
                    insight.category.to_string(),
                    format!("{:.0}", insight.confidence),
                    insight.title.clone(),
                ]
            })
            .collect::<Vec<_>>();
        sections.push(table::render_table(
            &["category", "confidence", "insight"],
            &insights,
            options,
        ));
    }

    if !result.villains.is_empty() {
        let villains = result
            .villains
            .iter()
            .map(|villain| {
                let name = mark(&villain.name, options.color);
                if villain.explanation.is_empty() {
                    format!("- {name}")
                } else {
                    format!("- {name}: {}", villain.explanation)
                }
            })
            .collect::<Vec<_>>();
        sections.push(format!("villains:\n{}", villains.join("\n")));
    }

    Ok(sections.join("\n\n"))
}

/// Join spans back into one line, marking matches with bold red or brackets.
#[must_use]
pub fn render_spans(spans: &[Span<'_>], color: bool) -> String {
    spans
        .iter()
        .map(|span| match span {
            Span::Plain { text } => (*text).to_string(),
            Span::Match { text, .. } => mark(text, color),
        })
        .collect()
}

fn mark(text: &str, color: bool) -> String {
    if color {
        table::paint(text, MATCH_STYLE)
    } else {
        format!("[{text}]")
    }
}

#[cfg(test)]
mod tests {
    use lens_core::Villain;
    use pretty_assertions::assert_eq;

    use super::*;

    const VERDICT: &str = r#"{
        "summary": "Sweet bar with corn syrup.",
        "audioScript": "Mostly Corn Syrup.",
        "shareContent": "42/100",
        "healthScore": 42,
        "dietaryClassification": "vegan",
        "uncertainty": { "isUncertain": true, "reason": "Blurry label." },
        "tradeoffs": { "pros": ["Quick energy"], "cons": ["Corn syrup heavy"] },
        "insights": [
            { "title": "Added sugars", "description": "Spikes blood sugar.", "category": "warning", "confidence": 85 }
        ],
        "radarData": [
            { "subject": "Sugar", "value": 90 },
            { "subject": "Protein", "value": 10 },
            { "subject": "Fiber", "value": 20 },
            { "subject": "Additives", "value": 60 },
            { "subject": "Processing", "value": 80 }
        ],
        "villains": [
            { "name": "Corn Syrup", "explanation": "Refined sweetener." }
        ]
    }"#;

    #[test]
    fn spans_render_with_brackets_without_color() {
        let terms = vec![Villain::new("salt", "")];
        let index = TermIndex::new(&terms).unwrap();
        assert_eq!(
            render_spans(&index.spans("Salt and more salt."), false),
            "[Salt] and more [salt]."
        );
    }

    #[test]
    fn spans_render_bold_red_with_color() {
        let terms = vec![Villain::new("salt", "")];
        let index = TermIndex::new(&terms).unwrap();
        let out = render_spans(&index.spans("salt"), true);
        assert_eq!(out, "\u{1b}[1;31msalt\u{1b}[0m");
    }

    #[test]
    fn table_verdict_marks_villains_in_every_text_field() {
        let result = AnalysisResult::from_json(VERDICT).unwrap();
        let out = render_verdict(&result, OutputFormat::Table).unwrap();

        assert!(out.contains("summary: Sweet bar with [corn syrup]."));
        assert!(out.contains("audioScript: Mostly [Corn Syrup]."));
        assert!(out.contains("cons[0]: [Corn syrup] heavy"));
        assert!(out.contains("uncertainty: Blurry label."));
        assert!(out.contains("- [Corn Syrup]: Refined sweetener."));
        assert!(out.contains("Processing"));
    }

    #[test]
    fn json_verdict_is_the_wire_object() {
        let result = AnalysisResult::from_json(VERDICT).unwrap();
        let out = render_verdict(&result, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["healthScore"], 42);
        assert_eq!(parsed["villains"][0]["name"], "Corn Syrup");
    }
}
