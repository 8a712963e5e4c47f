use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// Placeholder portrait used when a team member is created without an image.
pub const DEFAULT_TEAM_IMAGE: &str = "/images/team/placeholder.jpg";
/// Icon assigned to a stat when none is provided (a Lucide icon name).
pub const DEFAULT_STAT_ICON: &str = "Users";
/// Employment type assigned to a job opening when none is provided.
pub const DEFAULT_JOB_TYPE: &str = "Full-time";
/// Rating assigned to a testimonial when none (or zero) is provided.
pub const DEFAULT_RATING: i32 = 5;

// --- Resource Contract ---

/// Resource
///
/// The contract shared by the four managed content types. Handlers and stores are
/// written once against this trait and mounted per resource, so every resource gets
/// the same list/create/update/delete semantics.
pub trait Resource: Clone + Serialize + Send + Sync + Unpin + 'static {
    /// Payload accepted by `POST`. Optional fields fall back to fixed defaults.
    type Create: DeserializeOwned + Send + 'static;
    /// Payload accepted by `PUT`. The target `id` is read from the raw body before this
    /// is parsed, so a missing id is reported even when the other fields are malformed.
    type Patch: DeserializeOwned + Send + 'static;

    /// Human-readable singular name, used in error messages ("team member").
    const SINGULAR: &'static str;
    /// Human-readable plural name, used in error messages ("team members").
    const PLURAL: &'static str;

    fn id(&self) -> Uuid;
    fn order(&self) -> i32;

    /// Whether the record is shown on the public site. Resources without an
    /// `active` flag are always visible.
    fn is_visible(&self) -> bool {
        true
    }

    /// Builds a fresh record from a create payload, applying field defaults.
    fn build(id: Uuid, input: Self::Create, now: DateTime<Utc>) -> Self;

    /// Overwrites every field present in `patch`; absent fields keep their value.
    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>);
}

// --- Core Content Schemas (Mapped to Database) ---

/// TeamMember
///
/// A leadership profile shown in the "Our Team" section of the about page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub description: String,
    // Path or URL of the portrait.
    pub image: String,
    pub order: i32,
    // Inactive members stay in the admin listing but are hidden from visitors.
    pub active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Stat
///
/// A headline figure ("10+", "99.99%") rendered with a counter on the home and about pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Stat {
    pub id: Uuid,
    /// Display string, not a number: it may carry a suffix such as `+` or `%`.
    pub value: String,
    pub label: String,
    /// Name of the icon drawn next to the figure.
    pub icon: String,
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Testimonial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Testimonial {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub company: String,
    pub content: String,
    /// Expected in 1..=5. Not enforced server-side.
    pub rating: i32,
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// JobOpening
///
/// A position listed on the careers page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobOpening {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub location: String,

    // 'type' is a reserved keyword in Rust; the JSON key and the column are still named `type`.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub job_type: String,

    pub description: String,
    /// Free text, one requirement per line.
    pub requirements: String,
    pub active: bool,
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateTeamMemberRequest {
    pub name: String,
    pub role: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateStatRequest {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateTestimonialRequest {
    pub name: String,
    pub role: String,
    pub company: String,
    pub content: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateJobOpeningRequest {
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    pub description: String,
    pub requirements: String,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub order: Option<i32>,
}

/// UpdateTeamMemberRequest
///
/// Partial update payload (PUT /api/admin/team). Every field except `id` is optional and
/// only overwrites the stored value when present.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateTeamMemberRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateStatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateTestimonialRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateJobOpeningRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// LoginRequest
///
/// Credentials for the single admin account. Accepted as JSON by `/api/auth/login` and as a
/// form by `/admin/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// --- Output Schemas ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
}

/// Acknowledgement returned by DELETE and logout.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SuccessResponse {
    pub success: bool,
}

// --- Resource Implementations ---

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl Resource for TeamMember {
    type Create = CreateTeamMemberRequest;
    type Patch = UpdateTeamMemberRequest;

    const SINGULAR: &'static str = "team member";
    const PLURAL: &'static str = "team members";

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn is_visible(&self) -> bool {
        self.active
    }

    fn build(id: Uuid, input: CreateTeamMemberRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            role: input.role,
            description: input.description,
            image: input
                .image
                .filter(|image| !image.is_empty())
                .unwrap_or_else(|| DEFAULT_TEAM_IMAGE.to_string()),
            order: input.order.unwrap_or(0),
            active: input.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: UpdateTeamMemberRequest, now: DateTime<Utc>) {
        overwrite(&mut self.name, patch.name);
        overwrite(&mut self.role, patch.role);
        overwrite(&mut self.description, patch.description);
        overwrite(&mut self.image, patch.image);
        overwrite(&mut self.order, patch.order);
        overwrite(&mut self.active, patch.active);
        self.updated_at = now;
    }
}

impl Resource for Stat {
    type Create = CreateStatRequest;
    type Patch = UpdateStatRequest;

    const SINGULAR: &'static str = "stat";
    const PLURAL: &'static str = "stats";

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn build(id: Uuid, input: CreateStatRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            value: input.value,
            label: input.label,
            icon: input
                .icon
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| DEFAULT_STAT_ICON.to_string()),
            order: input.order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: UpdateStatRequest, now: DateTime<Utc>) {
        overwrite(&mut self.value, patch.value);
        overwrite(&mut self.label, patch.label);
        overwrite(&mut self.icon, patch.icon);
        overwrite(&mut self.order, patch.order);
        self.updated_at = now;
    }
}

impl Resource for Testimonial {
    type Create = CreateTestimonialRequest;
    type Patch = UpdateTestimonialRequest;

    const SINGULAR: &'static str = "testimonial";
    const PLURAL: &'static str = "testimonials";

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn build(id: Uuid, input: CreateTestimonialRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            role: input.role,
            company: input.company,
            content: input.content,
            // A zero rating is treated as "not provided".
            rating: input
                .rating
                .filter(|rating| *rating != 0)
                .unwrap_or(DEFAULT_RATING),
            order: input.order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: UpdateTestimonialRequest, now: DateTime<Utc>) {
        overwrite(&mut self.name, patch.name);
        overwrite(&mut self.role, patch.role);
        overwrite(&mut self.company, patch.company);
        overwrite(&mut self.content, patch.content);
        overwrite(&mut self.rating, patch.rating);
        overwrite(&mut self.order, patch.order);
        self.updated_at = now;
    }
}

impl Resource for JobOpening {
    type Create = CreateJobOpeningRequest;
    type Patch = UpdateJobOpeningRequest;

    const SINGULAR: &'static str = "job opening";
    const PLURAL: &'static str = "job openings";

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn is_visible(&self) -> bool {
        self.active
    }

    fn build(id: Uuid, input: CreateJobOpeningRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            department: input.department,
            location: input.location,
            job_type: input
                .job_type
                .filter(|job_type| !job_type.is_empty())
                .unwrap_or_else(|| DEFAULT_JOB_TYPE.to_string()),
            description: input.description,
            requirements: input.requirements,
            active: input.active.unwrap_or(true),
            order: input.order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: UpdateJobOpeningRequest, now: DateTime<Utc>) {
        overwrite(&mut self.title, patch.title);
        overwrite(&mut self.department, patch.department);
        overwrite(&mut self.location, patch.location);
        overwrite(&mut self.job_type, patch.job_type);
        overwrite(&mut self.description, patch.description);
        overwrite(&mut self.requirements, patch.requirements);
        overwrite(&mut self.active, patch.active);
        overwrite(&mut self.order, patch.order);
        self.updated_at = now;
    }
}
