// Device sub-resources and reference lists.
//
// These live under paths that are not top-level collections, so they go
// through the path-based pagination routine with fixed budgets.

use crate::Error;
use crate::client::ItPortalClient;
use crate::filters::ListFilters;
use crate::kind::{API_PREFIX, EntityKind, TypeCategory};
use crate::models::{Credential, DeviceIp, DeviceManagementUrl, DeviceNote, TypeItem};

const DEVICE_IP_BUDGET: usize = 500;
const DEVICE_NOTE_BUDGET: usize = 500;
const DEVICE_URL_BUDGET: usize = 100;
const DEVICE_CREDENTIAL_BUDGET: usize = 100;
const REFERENCE_LIST_BUDGET: usize = 500;

fn device_path(device_id: i64, sub: &str) -> String {
    format!("{}{sub}/", EntityKind::Devices.item_path(device_id))
}

impl ItPortalClient {
    // ── Device IPs ───────────────────────────────────────────────────

    pub async fn device_ips(&self, device_id: i64) -> Result<Vec<DeviceIp>, Error> {
        self.list_all_at(
            &device_path(device_id, "ips"),
            &ListFilters::default(),
            DEVICE_IP_BUDGET,
        )
        .await
    }

    pub async fn add_device_ip(&self, device_id: i64, ip: &DeviceIp) -> Result<DeviceIp, Error> {
        self.create_at(&device_path(device_id, "ips"), ip).await
    }

    // ── Device notes ─────────────────────────────────────────────────

    pub async fn device_notes(&self, device_id: i64) -> Result<Vec<DeviceNote>, Error> {
        self.list_all_at(
            &device_path(device_id, "notes"),
            &ListFilters::default(),
            DEVICE_NOTE_BUDGET,
        )
        .await
    }

    pub async fn add_device_note(
        &self,
        device_id: i64,
        note: &DeviceNote,
    ) -> Result<DeviceNote, Error> {
        self.create_at(&device_path(device_id, "notes"), note).await
    }

    // ── Management URLs ──────────────────────────────────────────────

    pub async fn device_management_urls(
        &self,
        device_id: i64,
    ) -> Result<Vec<DeviceManagementUrl>, Error> {
        self.list_all_at(
            &device_path(device_id, "managementUrls"),
            &ListFilters::default(),
            DEVICE_URL_BUDGET,
        )
        .await
    }

    pub async fn add_device_management_url(
        &self,
        device_id: i64,
        url: &DeviceManagementUrl,
    ) -> Result<DeviceManagementUrl, Error> {
        self.create_at(&device_path(device_id, "managementUrls"), url)
            .await
    }

    // ── Credentials ──────────────────────────────────────────────────

    /// Credentials stored on a device. The returned records include secrets;
    /// callers that display them must go through the redacting renderer.
    pub async fn device_credentials(&self, device_id: i64) -> Result<Vec<Credential>, Error> {
        self.list_all_at(
            &device_path(device_id, "credentials"),
            &ListFilters::default(),
            DEVICE_CREDENTIAL_BUDGET,
        )
        .await
    }

    // ── Reference lists ──────────────────────────────────────────────

    pub async fn list_types(&self, category: TypeCategory) -> Result<Vec<TypeItem>, Error> {
        self.list_all_at(
            &category.path(),
            &ListFilters::default(),
            REFERENCE_LIST_BUDGET,
        )
        .await
    }

    pub async fn list_kb_categories(&self) -> Result<Vec<TypeItem>, Error> {
        self.list_all_at(
            &format!("{API_PREFIX}/categories/kb/"),
            &ListFilters::default(),
            REFERENCE_LIST_BUDGET,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_sub_resource_paths() {
        assert_eq!(device_path(42, "ips"), "/api/2.0/devices/42/ips/");
        assert_eq!(
            device_path(7, "managementUrls"),
            "/api/2.0/devices/7/managementUrls/"
        );
    }
}
