// Deterministic local fallbacks.
// Pure functions of their inputs: no clock, no randomness. Every output still
// satisfies the CV schema (ids kept, highlight limits respected).

use crate::ai::letter::LetterLanguage;
use crate::models::cv::EXPERIENCE_HIGHLIGHT_MAX;
use crate::models::{CvDocument, ExperienceEntry};
use crate::recovery::{collapse_whitespace, title_case};

pub const SUMMARY_FALLBACK_MESSAGE: &str = "AI is unavailable; applied a local enhancement.";
pub const EXPERIENCE_FALLBACK_MESSAGE: &str =
    "AI is unavailable; highlights were tuned locally.";
pub const ADAPT_FALLBACK_MESSAGE: &str =
    "AI was partly unavailable; some sections were adapted locally.";
pub const ATS_FALLBACK_MESSAGE: &str = "AI is unavailable; applied local ATS optimizations.";
pub const LETTER_FALLBACK_MESSAGE: &str =
    "AI is unavailable; generated a template letter to edit.";

const SUMMARY_SIGNATURE: &str =
    "Elevated to emphasize measurable impact and strategic collaboration.";

/// Used when an experience rewrite has no keywords to work with.
const DEFAULT_EXPERIENCE_KEYWORD: &str = "impact";

/// Padding for skill and summary fallbacks when keyword extraction found
/// nothing usable.
const DEFAULT_ADAPT_KEYWORDS: [&str; 3] = ["strategy", "execution", "leadership"];

const ADAPT_SKILLS_CAP: usize = 15;
const ATS_SKILLS_CAP: usize = 20;

pub const ACTION_VERBS: [&str; 16] = [
    "Achieved",
    "Implemented",
    "Led",
    "Developed",
    "Managed",
    "Increased",
    "Reduced",
    "Optimized",
    "Delivered",
    "Drove",
    "Established",
    "Executed",
    "Spearheaded",
    "Streamlined",
    "Enhanced",
    "Generated",
];

const ATS_KEYWORDS: [&str; 5] = [
    "Project Management",
    "Cross-functional Collaboration",
    "Strategic Planning",
    "Process Improvement",
    "Data Analysis",
];

const ATS_EMPTY_HIGHLIGHT: &str =
    "Achieved key initiatives to drive business growth and operational excellence";

const ATS_SUMMARY_TAIL: &str = "Results-driven professional with proven expertise in delivering high-impact solutions and driving measurable business outcomes. Demonstrated success in cross-functional collaboration, strategic planning, and process optimization.";

fn without_trailing_period(text: &str) -> &str {
    text.trim().trim_end_matches('.').trim_end()
}

/// Original summary, an optional calibration clause, then a fixed sentence.
pub fn fallback_summary(summary: &str, context: Option<&str>) -> String {
    let mut out = format!("{}.", without_trailing_period(summary));
    if let Some(ctx) = context.map(str::trim).filter(|c| !c.is_empty()) {
        out.push_str(&format!(" Calibrated for {}.", without_trailing_period(ctx)));
    }
    out.push(' ');
    out.push_str(SUMMARY_SIGNATURE);
    out
}

/// Appends a keyword clause to every highlight, cycling through `keywords`.
/// A highlight that would exceed the schema limit is kept unchanged.
pub fn fallback_experience(entry: &ExperienceEntry, keywords: &[String]) -> ExperienceEntry {
    let keyword_at = |i: usize| -> String {
        match keywords.get(i % keywords.len().max(1)) {
            Some(k) => title_case(k),
            None => title_case(DEFAULT_EXPERIENCE_KEYWORD),
        }
    };

    let highlights = if entry.highlights.is_empty() {
        vec![format!(
            "Delivered measurable outcomes aligned with {} priorities.",
            keyword_at(0)
        )]
    } else {
        entry
            .highlights
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let tuned = format!(
                    "{} — Demonstrated {}.",
                    without_trailing_period(line),
                    keyword_at(i)
                );
                if tuned.chars().count() > EXPERIENCE_HIGHLIGHT_MAX {
                    line.clone()
                } else {
                    tuned
                }
            })
            .collect()
    };

    ExperienceEntry {
        highlights,
        ..entry.clone()
    }
}

fn padded_keywords(keywords: &[String]) -> Vec<String> {
    if keywords.is_empty() {
        DEFAULT_ADAPT_KEYWORDS.iter().map(|k| k.to_string()).collect()
    } else {
        keywords.to_vec()
    }
}

/// Adds up to three title-cased keywords the skill list lacks. Existing
/// skills are never removed; additions stop at the cap.
pub fn fallback_adapt_skills(skills: &[String], keywords: &[String]) -> Vec<String> {
    let mut out = skills.to_vec();
    for keyword in padded_keywords(keywords).iter().take(3) {
        if out.len() >= ADAPT_SKILLS_CAP {
            break;
        }
        let candidate = title_case(keyword);
        if !out.iter().any(|s| s.eq_ignore_ascii_case(&candidate)) {
            out.push(candidate);
        }
    }
    out
}

/// `"<summary> Tailored for k1, k2, k3."`
pub fn fallback_adapt_summary(summary: &str, keywords: &[String]) -> String {
    let tail = format!(
        "Tailored for {}.",
        padded_keywords(keywords)
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );
    let base = summary.trim();
    if base.is_empty() {
        tail
    } else {
        format!("{base} {tail}")
    }
}

fn ats_highlight(index: usize, line: &str) -> String {
    let stripped = line.trim_start_matches(|c: char| matches!(c, '-' | '*' | '•') || c.is_whitespace());
    let tuned = format!(
        "{} {}",
        ACTION_VERBS[index % ACTION_VERBS.len()],
        collapse_whitespace(stripped)
    );
    if tuned.chars().count() > EXPERIENCE_HIGHLIGHT_MAX {
        line.to_string()
    } else {
        tuned
    }
}

/// Local ATS pass: action-verb prefixes, a generic keyword block in skills,
/// and a results-oriented summary. Identity fields and ids are untouched.
pub fn fallback_ats(cv: &CvDocument) -> CvDocument {
    let mut out = cv.clone();

    let base = without_trailing_period(&cv.personal.summary);
    out.personal.summary = if base.is_empty() {
        ATS_SUMMARY_TAIL.to_string()
    } else {
        format!("{base}. {ATS_SUMMARY_TAIL}")
    };

    for entry in &mut out.experience {
        entry.highlights = if entry.highlights.is_empty() {
            vec![ATS_EMPTY_HIGHLIGHT.to_string()]
        } else {
            entry
                .highlights
                .iter()
                .enumerate()
                .map(|(i, line)| ats_highlight(i, line))
                .collect()
        };
    }

    for keyword in ATS_KEYWORDS {
        if out.skills.len() >= ATS_SKILLS_CAP {
            break;
        }
        let needle = keyword.to_lowercase();
        if !out
            .skills
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
        {
            out.skills.push(keyword.to_string());
        }
    }

    out
}

/// Template letter in the requested language, filled from the CV.
pub fn fallback_letter(cv: &CvDocument, job_position: &str, language: LetterLanguage) -> String {
    let p = &cv.personal;
    let position = job_position.trim();
    let title = if p.title.is_empty() {
        match language {
            LetterLanguage::En => "professional",
            LetterLanguage::Fr => "professionnel",
        }
    } else {
        p.title.as_str()
    };
    let skills = cv
        .skills
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    let recent = cv.latest_experience();

    let mut contact = vec![p.full_name.clone(), p.email.clone()];
    if !p.phone.is_empty() {
        contact.push(p.phone.clone());
    }

    match language {
        LetterLanguage::En => {
            let mut body = vec![
                "Dear Hiring Manager,".to_string(),
                format!(
                    "I am writing to express my strong interest in the {position} position. As a {title}, I am confident that my background makes me a strong candidate for this role."
                ),
            ];
            if let Some(exp) = recent {
                body.push(format!(
                    "In my role as {} at {}, I have built experience that maps directly onto what this position requires.",
                    exp.role, exp.company
                ));
            }
            if !skills.is_empty() {
                body.push(format!(
                    "My core skills include {skills}, which I would bring to your team from day one."
                ));
            }
            body.push(
                "I would welcome the opportunity to discuss how I can contribute to your organization. Thank you for considering my application.".to_string(),
            );
            body.push(format!("Sincerely,\n{}", contact.join("\n")));
            body.join("\n\n")
        }
        LetterLanguage::Fr => {
            let mut body = vec![
                "Madame, Monsieur,".to_string(),
                format!(
                    "Je vous écris pour vous faire part de mon vif intérêt pour le poste de {position}. En tant que {title}, je suis convaincu(e) que mon parcours correspond aux exigences de ce rôle."
                ),
            ];
            if let Some(exp) = recent {
                body.push(format!(
                    "Dans mon poste de {} chez {}, j'ai acquis une expérience directement utile pour cette fonction.",
                    exp.role, exp.company
                ));
            }
            if !skills.is_empty() {
                body.push(format!(
                    "Mes compétences principales incluent {skills}, que je mettrai au service de votre équipe dès mon arrivée."
                ));
            }
            body.push(
                "Je serais ravi(e) d'échanger avec vous sur ma contribution possible à votre organisation. Je vous remercie de l'attention portée à ma candidature.".to_string(),
            );
            body.push(format!(
                "Je vous prie d'agréer, Madame, Monsieur, l'expression de mes salutations distinguées.\n{}",
                contact.join("\n")
            ));
            body.join("\n\n")
        }
    }
}
