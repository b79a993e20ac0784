//! Prompt Builders
//!
//! Turns research notes into the natural-language request bodies and system
//! instructions sent to the inference service. Every builder is a pure
//! function of its inputs.

use archetype_core::{FeedbackRecord, ResearchNotes};

pub const PERSONA_SYSTEM_INSTRUCTION: &str =
    "You are a precise and insightful UX researcher. Create realistic, empathetic, and useful personas.";

pub const FEEDBACK_SYSTEM_INSTRUCTION: &str =
    "You are a gamified tutor. Be energetic, encouraging, but honest about gaps in the research.";

/// Flatten the research form into a labelled plain-text block.
pub fn notes_block(notes: &ResearchNotes) -> String {
    let fields = [
        ("Title", &notes.title),
        ("Stakeholder", &notes.stakeholder_tag),
        ("Description", &notes.description),
        ("Pain Points", &notes.pain_points),
        ("Needs", &notes.needs),
        ("Goals", &notes.goals),
        ("Actions", &notes.actions),
    ];

    fields
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Request body for persona synthesis.
pub fn persona_prompt(notes: &ResearchNotes) -> String {
    format!(
        "You are an expert User Researcher and UX Designer.\n\
         Analyze the following raw research data (interview notes, survey responses, or descriptions) \
         and synthesize it into distinct User Archetypes.\n\
         Focus on behavioral patterns, goals, and pain points.\n\n\
         Raw Data:\n\"\"\"\n{}\n\"\"\"\n\n\
         Generate 2 to 4 distinct archetypes that represent the key segments found in this data.",
        notes_block(notes)
    )
}

/// Request body for tutor feedback. Earlier feedback, when given, is embedded
/// so the service can judge how much the notes improved.
pub fn feedback_prompt(notes: &ResearchNotes, previous: Option<&FeedbackRecord>) -> String {
    let mut prompt = format!(
        "You are \"Professor Archetype\", a supportive but rigorous UX Design professor at a top design university.\n\
         A student has just submitted their research notes for their User Archetype project.\n\n\
         Student: {}\n\
         Team: {}\n\n\
         Your goal is to gamify their progress. Review their notes for depth, specificity, and empathy.\n\
         Address the student by name if possible.\n\n\
         Criteria for grading:\n\
         - Specificity: Are there specific details or just generalizations?\n\
         - Separation: Did they actually list behaviors in \"Actions\" and drivers in \"Motivations\"?\n\
         - Empathy: Do they understand the user's pain?\n\
         - Completeness: Is there enough data to build a persona?\n\n\
         Student's Work:\n{}\n",
        notes.researcher_name.trim(),
        notes.team_name.trim(),
        notes_block(notes)
    );

    if let Some(previous) = previous {
        prompt.push_str(&previous_feedback_block(previous));
    }

    prompt.push_str(
        "\nProvide constructive feedback, a grade, and questions to inspire them to edit and improve \
         their notes before generating the final personas.",
    );
    prompt
}

fn previous_feedback_block(previous: &FeedbackRecord) -> String {
    let bullets = |items: &[String]| {
        items
            .iter()
            .map(|item| format!("- {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "\nThis is a revision. Your previous review was:\n\
         Grade: {} (score {})\n\
         Title: {}\n\
         Improvements you asked for:\n{}\n\
         Questions you asked:\n{}\n\
         Judge whether the revision addressed these points. The score should reflect real improvement.\n",
        previous.grade,
        previous.score,
        previous.feedback_title,
        bullets(&previous.improvements),
        bullets(&previous.thought_provoking_questions)
    )
}

/// Request body for a portrait headshot.
pub fn portrait_prompt(image_prompt: &str) -> String {
    format!(
        "A high-quality, professional headshot of: {}. Photorealistic, neutral lighting, \
         solid color background, looking at camera. 4k resolution.",
        image_prompt.trim()
    )
}
