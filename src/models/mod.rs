//! Purpose: The JSON data model shared by the platform's microservices.
//! Exports: Profile, community, task, and task type aggregates with their sub-entities.
//! Invariants: Wire names follow the platform JSON contract (camelCase, `_creationTs`).

pub mod activity;
pub mod attributes;
pub mod community;
pub mod norm;
pub mod profile;
pub mod social;
pub mod task;
pub mod task_type;

pub use activity::{ActivityStatus, PlannedActivity, RelevantLocation};
pub use attributes::{Competence, Material, Meaning};
pub use community::{CommunityMember, CommunityProfile};
pub use norm::ProtocolNorm;
pub use profile::{Gender, ProfileDate, UserName, UserProfile};
pub use social::{Label, RelationshipType, Routine, ScoredLabel, SocialPractice, SocialRelationship};
pub use task::{Task, TaskGoal, TaskTransaction};
pub use task_type::TaskType;
