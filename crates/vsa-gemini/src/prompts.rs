//! Instruction templates.

/// Section headings the analysis must contain, in order.
pub const ANALYSIS_SECTIONS: [&str; 8] = [
    "STYLE",
    "NARRATIVE STRUCTURE",
    "CHARACTERS/CHARACTERISTICS",
    "THEMES & MESSAGES",
    "PACING & RHYTHM",
    "AUDIENCE ENGAGEMENT",
    "VISUAL & AESTHETIC CHOICES",
    "TECHNICAL ASPECTS",
];

/// Build the script-analysis instruction for the attached video.
///
/// Only `language` varies. The model is asked for a single JSON object
/// with an `analysis` string field holding the Markdown report.
pub fn analysis_from_video_prompt(language: &str) -> String {
    let sections = ANALYSIS_SECTIONS
        .iter()
        .map(|s| format!("**{}:**", s))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an experienced scriptwriter and story analyst. Watch the attached video and break down how its content was planned and produced: the script, its structure and the production choices behind it.

Write the report in Markdown using exactly these ALL CAPS section headings, in this order:

{sections}

Guidance for each section:
- STYLE: visual and thematic concept, references, register (formal, humorous, dramatic, educational) and how it connects with its audience.
- NARRATIVE STRUCTURE: how the content opens, develops and closes; transitions; linear, non-linear or episodic flow; turning points.
- CHARACTERS/CHARACTERISTICS: the role of the people or main elements in the narrative, never their physical appearance; how they are introduced and developed.
- THEMES & MESSAGES: central themes, conflicts or questions and how they are developed.
- PACING & RHYTHM: tempo, pauses, intensity and how much time each segment gets.
- AUDIENCE ENGAGEMENT: calls to action, direct address and other participation devices.
- VISUAL & AESTHETIC CHOICES: color, typography, graphics, imagery and visual metaphors supporting the narrative.
- TECHNICAL ASPECTS: editing, animation, effects, music and sound design serving the message.

Rules:
- Do not invent anything that is not in the video.
- Use screenwriting, content design and video production vocabulary.
- Be faithful enough that the report could guide a recreation of the material.

Output format:
Return ONLY a single JSON object of the form {{"analysis": "<the full Markdown report>"}} and nothing else.

IMPORTANT: The entire report must be written in {language}."#
    )
}
