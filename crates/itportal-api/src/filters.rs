// Query filters accepted by ITPortal list endpoints.

use std::collections::BTreeMap;

const PAGER_KEYS: [&str; 2] = ["limit", "offset"];

/// Filters for a list call. Empty fields are not sent.
///
/// Paging (`limit`/`offset`) is not part of the filter set; the client
/// supplies it per page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub name: Option<String>,
    pub name_starts_with: Option<String>,
    pub company_id: Option<i64>,
    pub site_id: Option<i64>,
    pub facility_id: Option<i64>,
    pub cabinet_id: Option<i64>,
    pub type_name: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub serial_number: Option<String>,
    pub tag: Option<String>,
    pub manufacturer: Option<String>,
    /// Date string in the portal's format, e.g. `2024-01-31`.
    pub modified_since: Option<String>,
    /// `None` = all, `Some(true)` = active, `Some(false)` = inactive.
    pub in_out: Option<bool>,
    pub deleted: Option<bool>,
    pub foreign_id: Option<String>,
    pub order_by: Option<String>,
    /// Endpoint-specific parameters passed through verbatim.
    pub extra: BTreeMap<String, String>,
}

impl ListFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name_starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.name_starts_with = Some(prefix.into());
        self
    }

    pub fn company(mut self, company_id: i64) -> Self {
        self.company_id = Some(company_id);
        self
    }

    pub fn site(mut self, site_id: i64) -> Self {
        self.site_id = Some(site_id);
        self
    }

    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn serial_number(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn modified_since(mut self, date: impl Into<String>) -> Self {
        self.modified_since = Some(date.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Query pairs in a stable order, one per key.
    ///
    /// An `extra` entry replaces a named filter with the same key. `limit`
    /// and `offset` belong to the pager and are never taken from `extra`.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut q: Vec<(String, String)> = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                q.push((key.to_owned(), v));
            }
        };

        push("name", self.name.clone());
        push("nameStartsWith", self.name_starts_with.clone());
        push("companyId", self.company_id.map(|v| v.to_string()));
        push("siteId", self.site_id.map(|v| v.to_string()));
        push("facilityId", self.facility_id.map(|v| v.to_string()));
        push("cabinetId", self.cabinet_id.map(|v| v.to_string()));
        push("typeName", self.type_name.clone());
        push("ipAddress", self.ip_address.clone());
        push("macAddress", self.mac_address.clone());
        push("serialNumber", self.serial_number.clone());
        push("tag", self.tag.clone());
        push("manufacturer", self.manufacturer.clone());
        push("modifiedSince", self.modified_since.clone());
        push("inOut", self.in_out.map(|v| v.to_string()));
        push("deleted", self.deleted.map(|v| v.to_string()));
        push("foreignId", self.foreign_id.clone());
        push("orderBy", self.order_by.clone());

        for (k, v) in &self.extra {
            if PAGER_KEYS.contains(&k.as_str()) {
                continue;
            }
            match q.iter_mut().find(|(existing, _)| existing == k) {
                Some(slot) => slot.1.clone_from(v),
                None => q.push((k.clone(), v.clone())),
            }
        }
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_produce_no_query() {
        assert!(ListFilters::new().to_query().is_empty());
    }

    #[test]
    fn set_filters_map_to_camel_case_keys() {
        let filters = ListFilters::new()
            .name_starts_with("core-")
            .company(12)
            .site(3)
            .ip_address("10.0.0.1")
            .modified_since("2024-01-31")
            .extra("foo", "bar");

        let mut filters = filters;
        filters.in_out = Some(false);

        assert_eq!(
            filters.to_query(),
            vec![
                ("nameStartsWith".to_owned(), "core-".to_owned()),
                ("companyId".to_owned(), "12".to_owned()),
                ("siteId".to_owned(), "3".to_owned()),
                ("ipAddress".to_owned(), "10.0.0.1".to_owned()),
                ("modifiedSince".to_owned(), "2024-01-31".to_owned()),
                ("inOut".to_owned(), "false".to_owned()),
                ("foo".to_owned(), "bar".to_owned()),
            ]
        );
    }

    #[test]
    fn extra_replaces_named_filter_and_skips_pager_keys() {
        let filters = ListFilters::new()
            .name("old")
            .company(1)
            .extra("name", "new")
            .extra("limit", "5")
            .extra("offset", "10");

        assert_eq!(
            filters.to_query(),
            vec![
                ("name".to_owned(), "new".to_owned()),
                ("companyId".to_owned(), "1".to_owned()),
            ]
        );
    }

    #[test]
    fn blank_strings_are_skipped() {
        let filters = ListFilters::new().name("").manufacturer("Dell");
        assert_eq!(
            filters.to_query(),
            vec![("manufacturer".to_owned(), "Dell".to_owned())]
        );
    }
}
