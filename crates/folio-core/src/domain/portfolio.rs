//! Portfolio document and its five sections

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::application::errors::FieldError;
use crate::error::{Error, Result};

/// Site content outside the project list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioDocument {
    pub hero: Hero,
    pub about: About,
    pub skills: Vec<SkillCategory>,
    pub contact: Contact,
    pub footer: Footer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub resume_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct About {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub email: String,
    pub github: String,
    pub github_username: String,
    pub linkedin: String,
    pub linkedin_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    pub copyright: String,
    pub note: String,
}

/// Name of an independently replaceable section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    About,
    Skills,
    Contact,
    Footer,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Hero,
        Section::About,
        Section::Skills,
        Section::Contact,
        Section::Footer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::About => "about",
            Section::Skills => "skills",
            Section::Contact => "contact",
            Section::Footer => "footer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.as_str() == s)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::InvalidSection(s.to_string()))
    }
}

/// A whole replacement value for one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionUpdate {
    Hero(Hero),
    About(About),
    Skills(Vec<SkillCategory>),
    Contact(Contact),
    Footer(Footer),
}

impl SectionUpdate {
    pub fn section(&self) -> Section {
        match self {
            SectionUpdate::Hero(_) => Section::Hero,
            SectionUpdate::About(_) => Section::About,
            SectionUpdate::Skills(_) => Section::Skills,
            SectionUpdate::Contact(_) => Section::Contact,
            SectionUpdate::Footer(_) => Section::Footer,
        }
    }

    /// The replacement value as stored under the section's key
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let value = match self {
            SectionUpdate::Hero(hero) => serde_json::to_value(hero),
            SectionUpdate::About(about) => serde_json::to_value(about),
            SectionUpdate::Skills(skills) => serde_json::to_value(skills),
            SectionUpdate::Contact(contact) => serde_json::to_value(contact),
            SectionUpdate::Footer(footer) => serde_json::to_value(footer),
        };
        value.map_err(|e| {
            Error::Other(format!("Failed to encode {} section: {}", self.section(), e))
        })
    }

    /// Replace this section inside a raw stored document
    ///
    /// Every other key, known or not, is left as read and keeps its position.
    pub fn splice_into(&self, document: &mut serde_json::Value) -> Result<()> {
        let value = self.to_json()?;
        let object = document.as_object_mut().ok_or_else(|| {
            Error::Other("Portfolio document is not a JSON object".to_string())
        })?;
        object.insert(self.section().as_str().to_string(), value);
        Ok(())
    }

    /// Parse an untyped payload for the named section
    ///
    /// Unknown names fail with `InvalidSection`; a payload of the wrong shape
    /// fails with `ValidationFailed` against the section name.
    pub fn from_json(name: &str, value: serde_json::Value) -> Result<Self> {
        let section: Section = name.parse()?;
        let shape_error = |e: serde_json::Error| {
            Error::ValidationFailed(
                vec![FieldError::new(section.as_str(), e.to_string())].into(),
            )
        };

        Ok(match section {
            Section::Hero => {
                SectionUpdate::Hero(serde_json::from_value(value).map_err(shape_error)?)
            }
            Section::About => {
                SectionUpdate::About(serde_json::from_value(value).map_err(shape_error)?)
            }
            Section::Skills => {
                SectionUpdate::Skills(serde_json::from_value(value).map_err(shape_error)?)
            }
            Section::Contact => {
                SectionUpdate::Contact(serde_json::from_value(value).map_err(shape_error)?)
            }
            Section::Footer => {
                SectionUpdate::Footer(serde_json::from_value(value).map_err(shape_error)?)
            }
        })
    }
}

impl PortfolioDocument {
    /// Replace one section wholesale, leaving the others untouched
    pub fn apply(&mut self, update: SectionUpdate) {
        match update {
            SectionUpdate::Hero(hero) => self.hero = hero,
            SectionUpdate::About(about) => self.about = about,
            SectionUpdate::Skills(skills) => self.skills = skills,
            SectionUpdate::Contact(contact) => self.contact = contact,
            SectionUpdate::Footer(footer) => self.footer = footer,
        }
    }

    /// JSON value of a single section
    pub fn section_json(&self, section: Section) -> Result<serde_json::Value> {
        let value = match section {
            Section::Hero => serde_json::to_value(&self.hero),
            Section::About => serde_json::to_value(&self.about),
            Section::Skills => serde_json::to_value(&self.skills),
            Section::Contact => serde_json::to_value(&self.contact),
            Section::Footer => serde_json::to_value(&self.footer),
        };
        value.map_err(|e| Error::Other(format!("Failed to encode {} section: {}", section, e)))
    }
}
