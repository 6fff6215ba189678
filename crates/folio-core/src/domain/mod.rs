//! Domain types
//!
//! The two persisted documents: the project collection and the portfolio
//! document with its five sections.

pub mod portfolio;
pub mod project;

pub use portfolio::{
    About, Contact, Footer, Hero, PortfolioDocument, Section, SectionUpdate, SkillCategory,
};
pub use project::{Project, ProjectFormData, ProjectInput, next_project_id, sort_newest_first};
