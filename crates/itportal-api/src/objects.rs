// Per-object templates and interactions, plus system reference lists.
//
// Templates and interactions hang off any object by `{object_type}/{id}`,
// where the object type is the portal's own name for it (e.g. `device`).

use reqwest::Method;
use serde_json::{Value, json};

use crate::Error;
use crate::client::ItPortalClient;
use crate::filters::ListFilters;
use crate::kind::API_PREFIX;
use crate::models::{Country, Interaction, Page, SecurityGroup, Template, User};

const USER_BUDGET: usize = 1000;
const SECURITY_GROUP_BUDGET: usize = 500;
const COUNTRY_BUDGET: usize = 300;

fn object_path(resource: &str, object_type: &str, object_id: i64) -> String {
    format!("{API_PREFIX}/{resource}/{object_type}/{object_id}/")
}

impl ItPortalClient {
    // ── Templates ────────────────────────────────────────────────────

    /// One page of template definitions.
    pub async fn list_templates(
        &self,
        filters: &ListFilters,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Template>, Error> {
        self.list_page_at(&format!("{API_PREFIX}/templates/"), filters, limit, offset)
            .await
    }

    /// Templates attached to one object, with their field values.
    pub async fn object_templates(
        &self,
        object_type: &str,
        object_id: i64,
    ) -> Result<Page<Template>, Error> {
        self.list_page_at(
            &object_path("templates", object_type, object_id),
            &ListFilters::default(),
            0,
            0,
        )
        .await
    }

    /// Set one template field on an object. The body is `{"value": ...}`.
    pub async fn update_template_field(
        &self,
        object_type: &str,
        object_id: i64,
        template_id: i64,
        field_id: i64,
        value: &Value,
    ) -> Result<(), Error> {
        let path = format!(
            "{}{template_id}/fields/{field_id}/",
            object_path("templates", object_type, object_id)
        );
        self.send_json(Method::PATCH, &path, &json!({ "value": value }))
            .await
            .map(drop)
    }

    // ── Interactions ─────────────────────────────────────────────────

    pub async fn interactions(
        &self,
        object_type: &str,
        object_id: i64,
    ) -> Result<Page<Interaction>, Error> {
        self.list_page_at(
            &object_path("interactions", object_type, object_id),
            &ListFilters::default(),
            0,
            0,
        )
        .await
    }

    pub async fn add_interaction(
        &self,
        object_type: &str,
        object_id: i64,
        interaction: &Interaction,
    ) -> Result<Interaction, Error> {
        self.create_at(
            &object_path("interactions", object_type, object_id),
            interaction,
        )
        .await
    }

    // ── System ───────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.list_all_at(
            &format!("{API_PREFIX}/system/users/"),
            &ListFilters::default(),
            USER_BUDGET,
        )
        .await
    }

    pub async fn list_security_groups(&self) -> Result<Vec<SecurityGroup>, Error> {
        self.list_all_at(
            &format!("{API_PREFIX}/system/groups/securityGroups/"),
            &ListFilters::default(),
            SECURITY_GROUP_BUDGET,
        )
        .await
    }

    pub async fn list_countries(&self) -> Result<Vec<Country>, Error> {
        self.list_all_at(
            &format!("{API_PREFIX}/system/countries/"),
            &ListFilters::default(),
            COUNTRY_BUDGET,
        )
        .await
    }
}
