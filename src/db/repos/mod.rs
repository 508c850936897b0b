//! One repository per entity. Each borrows the pool from [`super::Store`];
//! inputs arrive as `*Create` (full record, defaults for omitted fields) or
//! `*Patch` (only supplied fields are written).

mod categories;
mod dashboard;
mod feature_cards;
mod hero_sections;
mod media;
mod pages;
mod posts;
mod routes;
mod settings;
mod team_members;
mod users;

pub use categories::{CategoryCreate, CategoryPatch, CategoryRepo};
pub use dashboard::DashboardRepo;
pub use feature_cards::{FeatureCardCreate, FeatureCardPatch, FeatureCardRepo};
pub use hero_sections::{HeroSectionCreate, HeroSectionPatch, HeroSectionRepo};
pub use media::{MediaCreate, MediaRepo};
pub use pages::{PageCreate, PagePatch, PageRepo};
pub use posts::{PostCreate, PostPatch, PostRepo};
pub use routes::{RouteCreate, RoutePatch, RouteRepo};
pub use settings::{SettingInput, SettingRepo};
pub use team_members::{TeamMemberCreate, TeamMemberPatch, TeamMemberRepo};
pub use users::{UserRepo, UserUpsert};

use crate::error::KaptanError;

fn require_text(field: &str, value: &str) -> Result<(), KaptanError> {
    if value.trim().is_empty() {
        return Err(KaptanError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// A required column may be left out of a patch, but not blanked.
fn require_patch_text(field: &str, value: &Option<String>) -> Result<(), KaptanError> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}
