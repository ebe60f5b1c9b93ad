//! Stage 2: Directives — ordered instruction block for the compaction oracle.
//!
//! Sections always appear in the order of [`DirectiveKind`]; toggles only
//! decide whether an optional section is present.

use sc_core::types::is_english;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirectiveKind {
    Role,
    Task,
    Tone,
    Protection,
    Language,
    PreserveLinks,
    OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Role,
    /// `translate_to` is set when the message must be translated first.
    Task { max_chars: usize, translate_to: Option<String> },
    Tone { sector: String },
    Protection,
    Language { language: String },
    PreserveLinks,
    OutputFormat,
}

impl Directive {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::Role => DirectiveKind::Role,
            Self::Task { .. } => DirectiveKind::Task,
            Self::Tone { .. } => DirectiveKind::Tone,
            Self::Protection => DirectiveKind::Protection,
            Self::Language { .. } => DirectiveKind::Language,
            Self::PreserveLinks => DirectiveKind::PreserveLinks,
            Self::OutputFormat => DirectiveKind::OutputFormat,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Role => "You are an expert SMS copywriter. You rewrite outbound text \
                messages so they are shorter without losing their meaning."
                .to_string(),
            Self::Task { max_chars, translate_to: None } => format!(
                "Shorten the message to under {max_chars} characters while keeping its meaning. \
                 Only if you must, remove unnecessary punctuation, spacing and pleasantries \
                 to reach the limit."
            ),
            Self::Task { max_chars, translate_to: Some(language) } => format!(
                "First translate the message into {language}. Then shorten the translated \
                 message to under {max_chars} characters while keeping its meaning."
            ),
            Self::Tone { sector } => {
                format!("Keep the tone appropriate for a business in the {sector} sector.")
            }
            Self::Protection => "Text enclosed in square brackets, such as [Date] or [Name], \
                is a template placeholder. Never alter, delete or translate it."
                .to_string(),
            Self::Language { language } if is_english(language) => {
                "Use UK English spelling.".to_string()
            }
            Self::Language { language } => {
                format!("Write the final message in natural, fluent {language}.")
            }
            Self::PreserveLinks => {
                "Keep every link from the message exactly as written.".to_string()
            }
            Self::OutputFormat => "Reply with the final message only, with no quotes, \
                explanation or commentary."
                .to_string(),
        }
    }
}

/// Composed directive block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionDirectives {
    sections: Vec<Directive>,
}

impl CompactionDirectives {
    pub fn sections(&self) -> &[Directive] {
        &self.sections
    }

    pub fn kinds(&self) -> Vec<DirectiveKind> {
        self.sections.iter().map(Directive::kind).collect()
    }

    pub fn contains(&self, kind: DirectiveKind) -> bool {
        self.sections.iter().any(|d| d.kind() == kind)
    }

    /// One section per line.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(Directive::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct DirectiveBuilder {
    max_chars: usize,
    sector: String,
    protect_variables: bool,
    target_language: String,
}

impl DirectiveBuilder {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            sector: sc_core::types::DEFAULT_SECTOR.into(),
            protect_variables: true,
            target_language: sc_core::types::DEFAULT_LANGUAGE.into(),
        }
    }

    pub fn sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    pub fn protect_variables(mut self, on: bool) -> Self {
        self.protect_variables = on;
        self
    }

    pub fn target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = language.into();
        self
    }

    pub fn build(self) -> CompactionDirectives {
        let translate_to = (!is_english(&self.target_language))
            .then(|| self.target_language.trim().to_string());

        let mut sections = vec![
            Directive::Role,
            Directive::Task { max_chars: self.max_chars, translate_to },
            Directive::Tone { sector: self.sector },
        ];
        if self.protect_variables {
            sections.push(Directive::Protection);
        }
        sections.push(Directive::Language { language: self.target_language });
        sections.push(Directive::PreserveLinks);
        sections.push(Directive::OutputFormat);

        CompactionDirectives { sections }
    }
}

pub fn compose_directives(
    sector: &str,
    protect_variables: bool,
    target_language: &str,
    max_chars: usize,
) -> CompactionDirectives {
    DirectiveBuilder::new(max_chars)
        .sector(sector)
        .protect_variables(protect_variables)
        .target_language(target_language)
        .build()
}
