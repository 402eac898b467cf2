//! Prompt construction for the provider capabilities.
//!
//! Templates are embedded constants; one flavor per diagram kind where the
//! guidance differs. Reference examples are passed as in-context guidance,
//! never copied into the output.

use crate::catalog::ReferenceExample;
use crate::domain::{DiagramKind, GenerationRequest};

const METHODOLOGY_GUIDANCE: &str = "Favor clean left-to-right flow, labeled arrows, \
consistent node shapes, and a restrained color palette suitable for print.";

const PLOT_GUIDANCE: &str = "Favor labeled axes with units, legible tick marks, \
a legend only when needed, and colorblind-safe series colors.";

fn guidance(kind: DiagramKind) -> &'static str {
    match kind {
        DiagramKind::MethodologyDiagram => METHODOLOGY_GUIDANCE,
        DiagramKind::StatisticalPlot => PLOT_GUIDANCE,
    }
}

/// Prompt asking the model to score catalog candidates by relevance
pub fn rank(request: &GenerationRequest, candidates: &[ReferenceExample]) -> String {
    let mut listing = String::new();
    for candidate in candidates {
        let excerpt: String = candidate.description.chars().take(300).collect();
        listing.push_str(&format!("- id: {}\n  description: {}\n", candidate.id, excerpt));
    }

    format!(
        "You are selecting reference figures to guide a new figure.\n\
         Source text:\n{}\n\nIntent: {}\n\nCandidates:\n{}\n\
         Score every candidate for relevance from 0.0 to 1.0. Respond with JSON:\n\
         {{\"scores\": [{{\"id\": \"...\", \"score\": 0.0}}]}}",
        request.source_text, request.intent, listing
    )
}

/// Prompt producing the initial figure description
pub fn plan(request: &GenerationRequest, examples: &[ReferenceExample]) -> String {
    let mut guidance_block = String::new();
    for example in examples {
        guidance_block.push_str(&format!("- {}\n", example.description));
    }

    let raw_data = match &request.raw_data {
        Some(data) => format!("\nRaw data to plot:\n{data}\n"),
        None => String::new(),
    };

    format!(
        "Write a precise textual description of a publication-quality figure.\n\
         Source text:\n{}\n\nIntent: {}\n{}\n\
         Reference figures that worked well (for inspiration only, do not copy):\n{}\n\
         Describe layout, components, labels, and relationships. Respond with the \
         description only.",
        request.source_text, request.intent, raw_data, guidance_block
    )
}

/// Prompt refining a description against visual presentation rules
pub fn style(request: &GenerationRequest, description: &str) -> String {
    format!(
        "Refine the following figure description for visual presentation.\n\
         {}\n\nDescription:\n{}\n\n\
         Keep the content identical; improve only the visual specification. \
         Respond with the revised description only.",
        guidance(request.kind),
        description
    )
}

/// Prompt for image rendering
pub fn render(request: &GenerationRequest, description: &str) -> String {
    format!(
        "Render a publication-quality {} as a clean vector-style image.\n{}\n\n{}",
        match request.kind {
            DiagramKind::MethodologyDiagram => "methodology diagram",
            DiagramKind::StatisticalPlot => "statistical plot",
        },
        guidance(request.kind),
        description
    )
}

/// Prompt asking the critic to evaluate a rendered figure
pub fn critique(request: &GenerationRequest, description: &str) -> String {
    format!(
        "Evaluate the attached figure against its source material.\n\
         Source text:\n{}\n\nIntent: {}\n\nDescription used for rendering:\n{}\n\n\
         Check faithfulness, readability, conciseness, and aesthetics. Respond with JSON:\n\
         {{\"suggestions\": [\"...\"], \"revised_description\": \"...\"}}\n\
         Use an empty suggestions array and omit revised_description if the figure \
         is publication-ready.",
        request.source_text, request.intent, description
    )
}
