// Prompt builders for every AI task.
// Builders are pure: same inputs, byte-identical prompt.
// Templates use `{placeholder}` markers, filled in a single pass so text
// coming from the user is never re-scanned for markers.

use crate::ai::letter::LetterLanguage;
use crate::llm_client::prompts::{JSON_ONLY_RULES, PLAIN_TEXT_RULES};
use crate::models::{CvDocument, ExperienceEntry};

/// Summary enhancement. Replace: {context_line}, {rules}, {summary}
const SUMMARY_ENHANCEMENT_TEMPLATE: &str = r#"You are a career coach polishing a professional summary.
{context_line}Rewrite the summary to sound confident, results-oriented, and concise (max 3 sentences, under 75 words).
{rules}
Summary: """{summary}""""#;

/// Experience enhancement. Replace: {keywords_line}, {company}, {role},
/// {highlights}, {job_block}
const EXPERIENCE_ENHANCEMENT_TEMPLATE: &str = r#"You are a resume writer adapting one experience entry to a job posting.
Rewrite the highlights to emphasize the technologies and skills the job asks for.
Keep the company name, role title, and dates UNCHANGED.
{keywords_line}
Current Experience Entry:
Company: {company}
Role: {role}
Current Highlights: {highlights}

Rules:
- Return 3-5 bullet points, each under 25 words
- Start each bullet with a strong action verb
- Include specific technologies/skills from the job description naturally
- Focus on measurable outcomes and impact
- DO NOT use bold text, markdown formatting, asterisks, or any special formatting
- Write in plain text only, no introductions or conclusions
- Return ONLY the bullet points, one per line, no numbering or special characters
{job_block}"#;

/// Keyword extraction. Replace: {job_description}
const KEYWORD_EXTRACTION_TEMPLATE: &str = r#"Extract ALL technical skills, frameworks, programming languages, tools, and methodologies from this job description.
Include both hard technical skills (e.g., React, Python, AWS) and soft skills (e.g., leadership, agile).
Return them as a comma-separated list of keywords without any numbering, commentary, or extra text.
Job description:
{job_description}"#;

/// Summary adaptation. Replace: {keywords}, {rules}, {summary}
const SUMMARY_ADAPTATION_TEMPLATE: &str = r#"Rewrite this professional summary so the candidate clearly fits a job requiring these skills:
{keywords}

Make it confident, results-oriented, and clearly demonstrate experience with the required technologies.
Keep it under 80 words and 3 sentences maximum.
{rules}

Current summary:
{summary}"#;

/// Literal example of the CV JSON shape, embedded in JSON-returning prompts.
pub const CV_JSON_EXAMPLE: &str = r#"{
  "personal": {
    "fullName": "John Doe",
    "title": "Software Engineer",
    "summary": "Brief professional summary",
    "email": "john@example.com",
    "phone": "+1234567890",
    "location": "City, Country",
    "website": "https://example.com",
    "linkedin": "https://linkedin.com/in/johndoe"
  },
  "experience": [
    {
      "id": "exp1",
      "role": "Senior Engineer",
      "company": "Tech Corp",
      "location": "San Francisco",
      "startDate": "Jan 2020",
      "endDate": "Present",
      "highlights": ["Led team of 5 engineers", "Increased performance by 40%"]
    }
  ],
  "education": [
    {
      "id": "edu1",
      "school": "University Name",
      "degree": "Bachelor of Science in Computer Science",
      "location": "City",
      "startDate": "2015",
      "endDate": "2019",
      "highlights": ["GPA: 3.8"]
    }
  ],
  "projects": [
    {
      "id": "proj1",
      "name": "Project Name",
      "summary": "Brief description",
      "link": "https://github.com/user/repo",
      "highlights": ["Built with React", "10k+ users"]
    }
  ],
  "skills": ["JavaScript", "Python", "React"],
  "certifications": ["AWS Certified"],
  "languages": ["English", "Spanish"]
}"#;

/// CV import. Replace: {example}, {rules}, {resume_text}
const CV_IMPORT_TEMPLATE: &str = r#"You are an expert resume parser. Extract ALL available information from the resume below.

OUTPUT FORMAT: Return ONLY a valid JSON object with this exact structure:
{example}

EXTRACTION RULES:
1. Extract the person's real name from the resume and use it for "fullName" (never use a placeholder)
2. Extract the person's real email and use it for "email" (must be a valid email format)
3. Extract the job title/role and use it for "title"
4. Extract the professional summary/objective and use it for "summary"
5. Extract ALL job positions with their descriptions into the "experience" array
6. Extract ALL education entries into the "education" array
7. Extract ALL projects into the "projects" array
8. Extract ALL technical skills into the "skills" array
9. Extract certifications if present into the "certifications" array
10. Extract languages if present into the "languages" array

{rules}
- Preserve all bullet points from work experience as separate items in highlights
- Keep each highlight under 200 characters
- Keep dates in simple format: "Jan 2023", "2020", or "Present"

RESUME TO PARSE:
---
{resume_text}
---"#;

/// ATS optimization. Replace: {rules}, {cv_json}
const ATS_OPTIMIZATION_TEMPLATE: &str = r#"You are an expert ATS (Applicant Tracking System) optimization specialist.
Optimize the entire CV to be ATS-friendly while keeping it professional and impactful.

ATS Optimization Rules:
1. Include relevant keywords and industry-standard terminology
2. Start bullet points with action verbs (Led, Developed, Implemented, Managed, etc.)
3. Quantify achievements with numbers, percentages, and metrics whenever possible
4. Remove special characters and complex formatting
5. Use standard job titles and clear role descriptions
6. Keep content scannable with clear, concise language
7. Keep date formats consistent
8. Optimize for keyword matching without keyword stuffing

{rules}
- Return the same structure as the input CV
- Keep all IDs unchanged
- Keep fullName and email unchanged
- Keep each experience highlight under 260 characters

Current CV Data:
{cv_json}"#;

/// Motivation letter. Replace: {language_instruction}, {profile}, {experience},
/// {education}, {skills}, {job_position}
const MOTIVATION_LETTER_TEMPLATE: &str = r#"Generate a professional motivation letter for the following job application.

IMPORTANT: {language_instruction}

Applicant Information:
{profile}

Key Experience:
{experience}

Education:
{education}

Key Skills:
{skills}

Requirements:
1. Write a compelling motivation letter (250-400 words)
2. Express genuine interest in the position
3. Highlight relevant experience and skills that match the job requirements
4. Maintain a professional yet personable tone
5. Include proper letter structure (greeting, body paragraphs, closing)
6. Avoid cliches and generic statements

Generate ONLY the letter content without any markdown formatting, headers, or explanations. Start directly with the letter.

Job Position/Description:
{job_position}"#;

/// Internship subject suggestions. Replace: {profile}, {internship_text}
const INTERNSHIP_SUBJECTS_TEMPLATE: &str = r#"You are a career advisor analyzing an internship opportunity for a candidate.

CANDIDATE CV:
{profile}

Suggest ALL internship subjects from the document that match the candidate's profile, most relevant first.
Also extract the company contact email address and company name from the document if present.

Return ONLY a valid JSON object with this exact structure:
{
  "subjects": [
    {
      "subject": "Concise internship subject (max 15 words)",
      "explanation": "2-3 sentences on why this subject fits, citing specific skills, experience, or education from the CV"
    }
  ],
  "companyEmail": "contact@company.com",
  "companyName": "Company Name"
}

Rules:
- Return 1-4 subjects
- Use null for companyEmail or companyName when the document does not contain them
- Extract the EXACT email address as it appears in the document
- Return ONLY the JSON object, no other text or markdown

INTERNSHIP DOCUMENT:
{internship_text}"#;

/// Internship emails. Replace: {profile}, {subject}, {internship_text}
const INTERNSHIP_EMAILS_TEMPLATE: &str = r#"You are a professional email writer helping a candidate apply for an internship.

CANDIDATE CV:
{profile}

SELECTED INTERNSHIP SUBJECT: {subject}

Write TWO emails:
1. applicantEmail: the application the candidate sends for this internship.
   200-300 words, "Subject: ..." on the first line, then the body.
   Address "Dear Hiring Manager" if no name is known, highlight 2-3 matching skills or experiences,
   and sign with the candidate's contact information.
2. companyEmail: a formal company correspondence template.
   150-250 words, "Subject: ..." on the first line, then greeting, body, and closing.

Return ONLY a valid JSON object with this exact structure:
{
  "applicantEmail": "Subject: ...\n\nDear ...",
  "companyEmail": "Subject: ...\n\nDear ..."
}

DO NOT include markdown formatting, code blocks, or explanatory text.

INTERNSHIP DOCUMENT:
{internship_text}"#;

// ────────────────────────────────────────────────────────────────────────────
// Builders
// ────────────────────────────────────────────────────────────────────────────

/// Single-pass substitution of `{name}` markers. Unknown markers (and the
/// literal braces of embedded JSON shapes) are left as they are.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = after.find('}').and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (end, *value))
        });
        match hit {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn summary_enhancement(summary: &str, context: Option<&str>) -> String {
    let context_line = match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => format!("Context: {c}\n"),
        None => String::new(),
    };
    fill(
        SUMMARY_ENHANCEMENT_TEMPLATE,
        &[
            ("context_line", &context_line),
            ("rules", PLAIN_TEXT_RULES),
            ("summary", summary),
        ],
    )
}

pub fn experience_enhancement(
    entry: &ExperienceEntry,
    job_description: Option<&str>,
    keywords: &[String],
) -> String {
    let keywords_line = if keywords.is_empty() {
        String::new()
    } else {
        format!("Priority keywords: {}\n", keywords.join(", "))
    };
    let job_block = match job_description.map(str::trim).filter(|j| !j.is_empty()) {
        Some(job) => format!("\nJob Requirements/Description:\n{job}"),
        None => String::new(),
    };
    fill(
        EXPERIENCE_ENHANCEMENT_TEMPLATE,
        &[
            ("keywords_line", &keywords_line),
            ("company", &entry.company),
            ("role", &entry.role),
            ("highlights", &entry.highlights.join("; ")),
            ("job_block", &job_block),
        ],
    )
}

pub fn keyword_extraction(job_description: &str) -> String {
    fill(
        KEYWORD_EXTRACTION_TEMPLATE,
        &[("job_description", job_description)],
    )
}

pub fn summary_adaptation(summary: &str, keywords: &[String]) -> String {
    let top: Vec<&str> = keywords.iter().take(8).map(String::as_str).collect();
    fill(
        SUMMARY_ADAPTATION_TEMPLATE,
        &[
            ("keywords", &top.join(", ")),
            ("rules", PLAIN_TEXT_RULES),
            ("summary", summary),
        ],
    )
}

pub fn cv_import(resume_text: &str) -> String {
    fill(
        CV_IMPORT_TEMPLATE,
        &[
            ("example", CV_JSON_EXAMPLE),
            ("rules", JSON_ONLY_RULES),
            ("resume_text", resume_text),
        ],
    )
}

pub fn ats_optimization(cv: &CvDocument) -> Result<String, serde_json::Error> {
    let cv_json = serde_json::to_string_pretty(cv)?;
    Ok(fill(
        ATS_OPTIMIZATION_TEMPLATE,
        &[("rules", JSON_ONLY_RULES), ("cv_json", &cv_json)],
    ))
}

pub fn motivation_letter(cv: &CvDocument, job_position: &str, language: LetterLanguage) -> String {
    let language_instruction = match language {
        LetterLanguage::En => "Generate the letter in ENGLISH.",
        LetterLanguage::Fr => {
            "Generate the letter in FRENCH (Francais). Use formal French business language."
        }
    };
    let p = &cv.personal;
    let profile = format!(
        "- Name: {}\n- Title: {}\n- Summary: {}\n- Email: {}\n- Location: {}",
        p.full_name, p.title, p.summary, p.email, p.location
    );
    let experience = cv
        .experience
        .iter()
        .take(3)
        .map(|e| match e.highlights.first() {
            Some(h) => format!("- {} at {}: {h}", e.role, e.company),
            None => format!("- {} at {}", e.role, e.company),
        })
        .collect::<Vec<_>>()
        .join("\n");
    let skills: Vec<&str> = cv.skills.iter().take(8).map(String::as_str).collect();

    fill(
        MOTIVATION_LETTER_TEMPLATE,
        &[
            ("language_instruction", language_instruction),
            ("profile", &profile),
            ("experience", &experience),
            ("education", &education_lines(cv)),
            ("skills", &skills.join(", ")),
            ("job_position", job_position),
        ],
    )
}

pub fn internship_subjects(internship_text: &str, cv: &CvDocument) -> String {
    fill(
        INTERNSHIP_SUBJECTS_TEMPLATE,
        &[
            ("profile", &candidate_profile(cv, false)),
            ("internship_text", internship_text),
        ],
    )
}

pub fn internship_emails(internship_text: &str, cv: &CvDocument, subject: &str) -> String {
    fill(
        INTERNSHIP_EMAILS_TEMPLATE,
        &[
            ("profile", &candidate_profile(cv, true)),
            ("subject", subject),
            ("internship_text", internship_text),
        ],
    )
}

fn education_lines(cv: &CvDocument) -> String {
    cv.education
        .iter()
        .take(2)
        .map(|e| format!("- {} from {}", e.degree, e.school))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compact candidate summary. Contact details only when the output is
/// going to be signed by the candidate.
fn candidate_profile(cv: &CvDocument, with_contact: bool) -> String {
    let p = &cv.personal;
    let mut lines = vec![
        format!("- Name: {}", p.full_name),
        format!("- Title: {}", p.title),
        format!("- Summary: {}", p.summary),
    ];
    if with_contact {
        lines.push(format!("- Email: {}", p.email));
        lines.push(format!("- Phone: {}", p.phone));
        lines.push(format!("- Location: {}", p.location));
    }
    lines.push(format!("- Skills: {}", cv.skills.join(", ")));
    lines.push(format!(
        "- Recent Experience: {}",
        cv.experience
            .iter()
            .take(2)
            .map(|e| format!("{} at {}", e.role, e.company))
            .collect::<Vec<_>>()
            .join("; ")
    ));
    lines.push(format!(
        "- Education: {}",
        cv.education
            .iter()
            .take(2)
            .map(|e| format!("{} from {}", e.degree, e.school))
            .collect::<Vec<_>>()
            .join("; ")
    ));
    lines.join("\n")
}
