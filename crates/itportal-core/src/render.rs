// ── Markdown renderer ──
//
// Pure functions from collections to Markdown. Nothing here touches the
// network or the clock; identical input renders to identical bytes.
//
// Secrets never reach the output: the renderers below do not read any
// password or 2FA field, so there is nothing to leak even by accident.

use std::fmt::{Display, Write as _};

use chrono::{DateTime, Utc};
use itportal_api::EntityKind;
use itportal_api::models::{
    Account, AdditionalCredential, Address, Agreement, Cabinet, Company, Configuration, Contact,
    Credential, Device, Document, Facility, IpNetwork, IpRef, Kb, Reference, Site,
};

use crate::snapshot::Collections;

/// Character cap for free-text fields.
pub const TEXT_LIMIT: usize = 300;
/// Character cap for knowledge-base article bodies.
pub const KB_CONTENT_LIMIT: usize = 500;

const ELLIPSIS: char = '…';

// ── Text helpers ─────────────────────────────────────────────────────

/// Turn an HTML fragment into a single line of plain text.
///
/// Block breaks become spaces, every other tag is dropped and runs of
/// whitespace collapse to one space.
pub fn clean_html(raw: &str) -> String {
    let mut s = raw.to_owned();
    for br in ["<br>", "<br/>", "<br />", "</p>", "</div>"] {
        s = s.replace(br, " ");
    }

    let mut stripped = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean `raw` and cap it at `max` characters, appending `…` when cut.
pub fn truncate(raw: &str, max: usize) -> String {
    let clean = clean_html(raw);
    if clean.chars().count() <= max {
        return clean;
    }
    let mut cut: String = clean.chars().take(max).collect();
    cut.push(ELLIPSIS);
    cut
}

/// One-line postal address; empty parts are skipped.
pub fn format_address(address: &Address) -> String {
    let city = [&address.city, &address.state, &address.zip]
        .into_iter()
        .filter_map(|p| p.as_deref())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    [
        address.address1.as_deref().unwrap_or_default(),
        address.address2.as_deref().unwrap_or_default(),
        city.as_str(),
        address.country.as_deref().unwrap_or_default(),
    ]
    .into_iter()
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

fn name_of(reference: Option<&Reference>) -> Option<&str> {
    reference.map(Reference::label).filter(|n| !n.is_empty())
}

// ── Section labels ───────────────────────────────────────────────────

fn section_title(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Companies => "Companies",
        EntityKind::Sites => "Sites",
        EntityKind::Devices => "Devices",
        EntityKind::Kbs => "Knowledge Base Articles",
        EntityKind::Contacts => "Contacts",
        EntityKind::Agreements => "Agreements",
        EntityKind::IpNetworks => "IP Networks",
        EntityKind::Documents => "Documents",
        EntityKind::Accounts => "Accounts",
        EntityKind::Facilities => "Facilities",
        EntityKind::Cabinets => "Cabinets",
        EntityKind::Configurations => "Configurations",
        EntityKind::AdditionalCredentials => "Additional Credentials",
        EntityKind::FormInstances => "Forms",
    }
}

/// Lower-case label used in the summary line, e.g. `KB articles`.
pub fn summary_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Companies => "companies",
        EntityKind::Sites => "sites",
        EntityKind::Devices => "devices",
        EntityKind::Kbs => "KB articles",
        EntityKind::Contacts => "contacts",
        EntityKind::Agreements => "agreements",
        EntityKind::IpNetworks => "IP networks",
        EntityKind::Documents => "documents",
        EntityKind::Accounts => "accounts",
        EntityKind::Facilities => "facilities",
        EntityKind::Cabinets => "cabinets",
        EntityKind::Configurations => "configurations",
        EntityKind::AdditionalCredentials => "additional credentials",
        EntityKind::FormInstances => "forms",
    }
}

// ── Document builder ─────────────────────────────────────────────────

#[derive(Default)]
struct Doc {
    out: String,
}

impl Doc {
    fn line(&mut self, text: impl Display) {
        let _ = writeln!(self.out, "{text}");
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// `### {title} (ID: n)[ [type]][ — context]`
    fn heading(&mut self, title: &str, id: i64, type_ref: Option<&Reference>, context: &str) {
        let _ = write!(self.out, "### {title} (ID: {id})");
        self.heading_suffix(type_ref, context);
    }

    fn heading_suffix(&mut self, type_ref: Option<&Reference>, context: &str) {
        if let Some(type_name) = name_of(type_ref) {
            let _ = write!(self.out, " [{type_name}]");
        }
        if !context.is_empty() {
            let _ = write!(self.out, " — {context}");
        }
        self.out.push('\n');
    }

    fn field(&mut self, label: &str, value: impl Display) {
        let _ = writeln!(self.out, "- **{label}**: {value}");
    }

    fn text(&mut self, label: &str, value: Option<&String>) {
        if let Some(v) = non_empty(value) {
            self.field(label, v);
        }
    }

    fn long_text(&mut self, label: &str, value: Option<&String>, max: usize) {
        if let Some(v) = non_empty(value) {
            self.field(label, truncate(v, max));
        }
    }

    /// `- **Label**: name (ID: n)`
    fn reference(&mut self, label: &str, value: Option<&Reference>) {
        if let Some(r) = value {
            let _ = writeln!(self.out, "- **{label}**: {} (ID: {})", r.label(), r.id);
        }
    }

    /// `- **Label**: name`, omitted when the name is empty.
    fn name(&mut self, label: &str, value: Option<&Reference>) {
        if let Some(n) = name_of(value) {
            self.field(label, n);
        }
    }

    fn ip(&mut self, label: &str, value: Option<&IpRef>) {
        if let Some(ip) = value.and_then(|r| non_empty(r.ip.as_ref())) {
            self.field(label, ip);
        }
    }

    fn address(&mut self, value: Option<&Address>) {
        if let Some(a) = value {
            let formatted = format_address(a);
            if !formatted.is_empty() {
                self.field("Address", formatted);
            }
        }
    }

    fn positive(&mut self, label: &str, value: Option<i64>) {
        if let Some(n) = value.filter(|n| *n > 0) {
            self.field(label, n);
        }
    }

    fn section<T>(&mut self, kind: EntityKind, items: &[T], mut item: impl FnMut(&mut Self, &T)) {
        let _ = writeln!(self.out, "## {} ({})\n", section_title(kind), items.len());
        for it in items {
            item(self, it);
            self.blank();
        }
    }
}

/// Display title, falling back to `"{noun} #{id}"` when the name is empty.
fn title(name: Option<&String>, noun: &str, id: i64) -> String {
    non_empty(name).map_or_else(|| format!("{noun} #{id}"), str::to_owned)
}

fn company_context(company: Option<&Reference>) -> String {
    name_of(company).unwrap_or_default().to_owned()
}

// ── Snapshot document ────────────────────────────────────────────────

/// Render all twelve collections as one Markdown document.
///
/// Every section is present, even when empty, so consumers can rely on the
/// layout.
pub fn render_snapshot(c: &Collections, generated_at: DateTime<Utc>) -> String {
    let mut doc = Doc::default();

    doc.line("# ITPortal Documentation Snapshot\n");
    doc.line(format_args!(
        "_Generated: {} UTC_\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    let summary = c
        .counts()
        .into_iter()
        .map(|(kind, n)| format!("{n} {}", summary_label(kind)))
        .collect::<Vec<_>>()
        .join(" · ");
    doc.line(format_args!("**Summary:** {summary}\n"));
    doc.line("---\n");

    doc.section(EntityKind::Companies, &c.companies, render_company);
    doc.section(EntityKind::Sites, &c.sites, render_site);
    doc.section(EntityKind::Devices, &c.devices, render_device);
    doc.section(EntityKind::Kbs, &c.kbs, render_kb);
    doc.section(EntityKind::Contacts, &c.contacts, render_contact);
    doc.section(EntityKind::Agreements, &c.agreements, render_agreement);
    doc.section(EntityKind::IpNetworks, &c.ip_networks, render_ip_network);
    doc.section(EntityKind::Documents, &c.documents, render_document);
    doc.section(EntityKind::Accounts, &c.accounts, render_account);
    doc.section(EntityKind::Facilities, &c.facilities, render_facility);
    doc.section(EntityKind::Cabinets, &c.cabinets, render_cabinet);
    doc.section(
        EntityKind::Configurations,
        &c.configurations,
        render_configuration,
    );

    doc.out
}

// ── Per-kind renderers ───────────────────────────────────────────────

fn render_company(doc: &mut Doc, co: &Company) {
    doc.heading(&title(co.name.as_ref(), "Company", co.id), co.id, None, "");
    doc.text("Code", co.abbreviation.as_ref());
    doc.text("Status", co.status.as_ref());
    doc.text("Website", co.web_site.as_ref());
    doc.long_text("Description", co.description.as_ref(), TEXT_LIMIT);
    doc.address(co.address.as_ref());
    doc.text("Client Since", co.start_date.as_ref());
    doc.long_text("Notes", co.notes.as_ref(), TEXT_LIMIT);
    doc.long_text(
        "Remote Access Notes",
        co.remote_access_notes.as_ref(),
        TEXT_LIMIT,
    );
    doc.text("Portal Link", co.url.as_ref());
}

fn render_site(doc: &mut Doc, si: &Site) {
    doc.heading(
        &title(si.name.as_ref(), "Site", si.id),
        si.id,
        None,
        &company_context(si.company.as_ref()),
    );
    doc.reference("Company", si.company.as_ref());
    doc.long_text("Description", si.description.as_ref(), TEXT_LIMIT);
    doc.address(si.address.as_ref());
    doc.reference("Main Contact", si.contact.as_ref());
    doc.positive("Number of PCs", si.number_of_pcs);
    doc.text("Portal Link", si.url.as_ref());
}

fn render_device(doc: &mut Doc, d: &Device) {
    let mut context = company_context(d.company.as_ref());
    if let Some(site) = name_of(d.site.as_ref()).filter(|_| !context.is_empty()) {
        context = format!("{context} / {site}");
    }

    doc.heading(
        &title(d.name.as_ref(), "Device", d.id),
        d.id,
        d.device_type.as_ref(),
        &context,
    );
    doc.reference("Company", d.company.as_ref());
    doc.reference("Site", d.site.as_ref());
    doc.name("Type", d.device_type.as_ref());

    let hardware = [d.manufacturer.as_deref(), d.model.as_deref()]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !hardware.is_empty() {
        doc.field("Hardware", hardware);
    }

    doc.text("Serial", d.serial.as_ref());
    doc.text("Tag", d.tag.as_ref());
    doc.text("IMEI", d.imei.as_ref());
    doc.long_text("Description", d.description.as_ref(), TEXT_LIMIT);
    doc.text("Location", d.location.as_ref());
    doc.text("Install Date", d.install_date.as_ref());
    doc.text("Warranty Expires", d.warranty_expires.as_ref());
    doc.text("Portal Link", d.url.as_ref());
}

fn render_kb(doc: &mut Doc, kb: &Kb) {
    doc.heading(
        &title(kb.name.as_ref(), "Article", kb.id),
        kb.id,
        None,
        &company_context(kb.company.as_ref()),
    );
    doc.reference("Company", kb.company.as_ref());
    doc.name("Category", kb.category.as_ref());
    doc.long_text("Content", kb.description.as_ref(), KB_CONTENT_LIMIT);
    doc.text("Expires", kb.expires.as_ref());
    doc.text("Last Modified", kb.modified.as_ref());
    doc.text("Portal Link", kb.url.as_ref());
}

fn render_contact(doc: &mut Doc, co: &Contact) {
    let full_name = [co.first_name.as_deref(), co.last_name.as_deref()]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    doc.heading(
        &title(Some(&full_name), "Contact", co.id),
        co.id,
        None,
        &company_context(co.company.as_ref()),
    );
    doc.reference("Company", co.company.as_ref());
    doc.name("Role", co.contact_type.as_ref());
    doc.text("Email", co.email.as_ref());
    doc.text("Direct", co.direct_number.as_ref());
    doc.text("Mobile", co.mobile.as_ref());
    doc.name("Site", co.site.as_ref());
}

fn render_agreement(doc: &mut Doc, ag: &Agreement) {
    let _ = write!(doc.out, "### Agreement ID: {}", ag.id);
    doc.heading_suffix(
        ag.agreement_type.as_ref(),
        &company_context(ag.company.as_ref()),
    );
    doc.reference("Company", ag.company.as_ref());
    doc.long_text("Description", ag.description.as_ref(), TEXT_LIMIT);
    doc.text("Vendor", ag.vendor.as_ref());
    doc.text("Expires", ag.date_expires.as_ref());
    doc.text("Portal Link", ag.url.as_ref());
}

fn render_ip_network(doc: &mut Doc, net: &IpNetwork) {
    doc.heading(
        &title(net.name.as_ref(), "Network", net.id),
        net.id,
        None,
        &company_context(net.company.as_ref()),
    );
    doc.reference("Company", net.company.as_ref());
    doc.name("Site", net.site.as_ref());

    let network = non_empty(net.network.as_ref());
    let mask = non_empty(net.subnet_mask.as_ref());
    if network.is_some() || mask.is_some() {
        doc.field(
            "Network",
            format_args!(
                "{} / {}",
                network.unwrap_or_default(),
                mask.unwrap_or_default()
            ),
        );
    }

    doc.ip("Default Gateway", net.default_gateway.as_ref());
    doc.ip("DNS Primary", net.dns_server1.as_ref());
    doc.ip("DNS Secondary", net.dns_server2.as_ref());
    doc.positive("VLAN", net.vlan_id);
    doc.long_text("Notes", net.description.as_ref(), TEXT_LIMIT);
}

fn render_document(doc: &mut Doc, d: &Document) {
    let heading = non_empty(d.description.as_ref())
        .map_or_else(|| format!("Document #{}", d.id), |t| truncate(t, TEXT_LIMIT));
    doc.heading(
        &heading,
        d.id,
        d.document_type.as_ref(),
        &company_context(d.company.as_ref()),
    );
    doc.reference("Company", d.company.as_ref());
    doc.name("Type", d.document_type.as_ref());
    doc.text("Link", d.url_link.as_ref());
    doc.text("Last Modified", d.modified.as_ref());
    doc.text("Portal Link", d.url.as_ref());
}

/// Accounts: `password` and `2faCode` are never read.
fn render_account(doc: &mut Doc, ac: &Account) {
    let _ = write!(doc.out, "### Account ID: {}", ac.id);
    doc.heading_suffix(
        ac.account_type.as_ref(),
        &company_context(ac.company.as_ref()),
    );
    doc.reference("Company", ac.company.as_ref());
    doc.name("Type", ac.account_type.as_ref());
    doc.text("Username", ac.username.as_ref());
    doc.text("Account Number", ac.account_number.as_ref());
    doc.text("Email", ac.email.as_ref());
    doc.text("Representative", ac.representative.as_ref());
    doc.text("Tech Support", ac.tech_telephone.as_ref());
    doc.text("Sales", ac.sales_telephone.as_ref());
    doc.text("Account URL", ac.account_url.as_ref());
    doc.text("Expires", ac.expires.as_ref());
    doc.long_text("Description", ac.description.as_ref(), TEXT_LIMIT);
    doc.long_text("Notes", ac.notes.as_ref(), TEXT_LIMIT);
    doc.text("Portal Link", ac.url.as_ref());
}

fn render_facility(doc: &mut Doc, f: &Facility) {
    doc.heading(
        &title(f.name.as_ref(), "Facility", f.id),
        f.id,
        f.facility_type.as_ref(),
        &company_context(f.company.as_ref()),
    );
    doc.reference("Company", f.company.as_ref());
    doc.reference("Site", f.site.as_ref());
    doc.name("Type", f.facility_type.as_ref());
    doc.long_text("Description", f.description.as_ref(), TEXT_LIMIT);
    doc.positive("Number of Users", f.number_of_users);
    doc.address(f.address.as_ref());
    doc.long_text("Notes", f.notes.as_ref(), TEXT_LIMIT);
    doc.text("Portal Link", f.url.as_ref());
}

fn render_cabinet(doc: &mut Doc, cab: &Cabinet) {
    doc.heading(
        &title(cab.name.as_ref(), "Cabinet", cab.id),
        cab.id,
        None,
        &company_context(cab.company.as_ref()),
    );
    doc.reference("Company", cab.company.as_ref());
    doc.reference("Site", cab.site.as_ref());
    doc.reference("Facility", cab.facility.as_ref());
    doc.reference("Contact", cab.contact.as_ref());
    doc.long_text("Description", cab.description.as_ref(), TEXT_LIMIT);
    doc.address(cab.address.as_ref());
    doc.long_text("Notes", cab.notes.as_ref(), TEXT_LIMIT);
    doc.text("Portal Link", cab.url.as_ref());
}

fn render_configuration(doc: &mut Doc, cfg: &Configuration) {
    doc.heading(
        &title(cfg.name.as_ref(), "Configuration", cfg.id),
        cfg.id,
        cfg.configuration_type.as_ref(),
        &company_context(cfg.company.as_ref()),
    );
    doc.reference("Company", cfg.company.as_ref());
    doc.name("Type", cfg.configuration_type.as_ref());
    doc.reference("Device", cfg.device.as_ref());
    doc.text("Install Date", cfg.install_date.as_ref());
    doc.text("Expires", cfg.date_expires.as_ref());
    doc.long_text("Notes", cfg.notes.as_ref(), TEXT_LIMIT);
    doc.text("Portal Link", cfg.url.as_ref());
}

// ── Credentials ──────────────────────────────────────────────────────

/// Device credentials without their secrets: `password` and `2faCode` are
/// never read.
pub fn render_credentials(credentials: &[Credential]) -> String {
    let mut doc = Doc::default();
    for cred in credentials {
        let heading = non_empty(cred.description.as_ref())
            .map_or_else(|| format!("Credential #{}", cred.id), |t| truncate(t, TEXT_LIMIT));
        doc.heading(&heading, cred.id, None, "");
        doc.text("Username", cred.username.as_ref());
        doc.text("Domain", cred.domain.as_ref());
        doc.blank();
    }
    doc.out
}

/// Additional credentials without their secrets: `password` is never read.
pub fn render_additional_credentials(credentials: &[AdditionalCredential]) -> String {
    let mut doc = Doc::default();
    doc.section(
        EntityKind::AdditionalCredentials,
        credentials,
        |doc, cred| {
            let heading = non_empty(cred.description.as_ref())
                .map_or_else(|| format!("Credential #{}", cred.id), |t| truncate(t, TEXT_LIMIT));
            doc.heading(&heading, cred.id, None, "");
            doc.text("Username", cred.username.as_ref());
            doc.text("URL", cred.url.as_ref());
        },
    );
    doc.out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn reference(id: i64, name: &str) -> Option<Reference> {
        Some(Reference {
            id,
            name: Some(name.to_owned()),
        })
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap()
    }

    // ── Text helpers ────────────────────────────────────────────────

    #[test]
    fn clean_html_converts_breaks_and_strips_tags() {
        assert_eq!(
            clean_html("<p>Line one</p><div>two<br/>three<br />four</div>  <b>bold</b>"),
            "Line one two three four bold"
        );
        assert_eq!(clean_html("a<br>b"), "a b");
    }

    #[test]
    fn truncate_caps_code_points_and_appends_ellipsis() {
        let long = "é".repeat(301);
        let cut = truncate(&long, TEXT_LIMIT);
        assert_eq!(cut.chars().count(), 301);
        assert!(cut.ends_with('…'));
        assert!(cut.starts_with("éé"));

        let exact = "x".repeat(300);
        assert_eq!(truncate(&exact, TEXT_LIMIT), exact);
    }

    #[test]
    fn truncate_measures_after_cleaning() {
        let padded = format!("<p>{}</p>", "y".repeat(300));
        assert_eq!(truncate(&padded, TEXT_LIMIT), "y".repeat(300));
    }

    #[test]
    fn address_skips_empty_parts() {
        let address = Address {
            address1: Some("1 Main St".into()),
            city: Some("Springfield".into()),
            zip: Some("12345".into()),
            country: Some("US".into()),
            ..Address::default()
        };
        assert_eq!(format_address(&address), "1 Main St, Springfield 12345, US");
        assert_eq!(format_address(&Address::default()), "");
    }

    // ── Snapshot document ───────────────────────────────────────────

    #[test]
    fn empty_snapshot_has_every_section() {
        let md = render_snapshot(&Collections::default(), at());

        assert!(md.starts_with("# ITPortal Documentation Snapshot\n\n_Generated: 2024-03-05 07:08:09 UTC_\n\n"));
        assert!(md.contains("**Summary:** 0 companies · 0 sites · 0 devices · 0 KB articles · 0 contacts · 0 agreements · 0 IP networks · 0 documents · 0 accounts · 0 facilities · 0 cabinets · 0 configurations\n"));
        for title in [
            "## Companies (0)",
            "## Sites (0)",
            "## Devices (0)",
            "## Knowledge Base Articles (0)",
            "## Contacts (0)",
            "## Agreements (0)",
            "## IP Networks (0)",
            "## Documents (0)",
            "## Accounts (0)",
            "## Facilities (0)",
            "## Cabinets (0)",
            "## Configurations (0)",
        ] {
            assert!(md.contains(title), "missing {title}");
        }
    }

    #[test]
    fn site_renders_heading_and_fields() {
        let collections = Collections {
            sites: vec![Site {
                id: 4,
                name: Some("HQ".into()),
                company: reference(1, "Acme"),
                number_of_pcs: Some(12),
                description: Some("<p>Main office</p>".into()),
                ..Site::default()
            }],
            ..Collections::default()
        };

        let md = render_snapshot(&collections, at());
        let expected = "## Sites (1)\n\n\
                        ### HQ (ID: 4) — Acme\n\
                        - **Company**: Acme (ID: 1)\n\
                        - **Description**: Main office\n\
                        - **Number of PCs**: 12\n\n";
        assert!(md.contains(expected), "got:\n{md}");
    }

    #[test]
    fn device_heading_carries_type_and_location() {
        let collections = Collections {
            devices: vec![Device {
                id: 9,
                name: Some("fw01".into()),
                company: reference(1, "Acme"),
                site: reference(4, "HQ"),
                device_type: reference(2, "Firewall"),
                manufacturer: Some("Fortinet".into()),
                model: Some("60F".into()),
                ..Device::default()
            }],
            ..Collections::default()
        };

        let md = render_snapshot(&collections, at());
        assert!(md.contains("### fw01 (ID: 9) [Firewall] — Acme / HQ\n"));
        assert!(md.contains("- **Hardware**: Fortinet 60F\n"));
        assert!(md.contains("- **Type**: Firewall\n"));
    }

    #[test]
    fn account_secrets_never_rendered() {
        let collections = Collections {
            accounts: vec![Account {
                id: 3,
                username: Some("admin".into()),
                password: Some("S3cr3t!pw".into()),
                two_fa_code: Some("998877".into()),
                account_type: reference(5, "Registrar"),
                ..Account::default()
            }],
            ..Collections::default()
        };

        let md = render_snapshot(&collections, at());
        assert!(md.contains("### Account ID: 3 [Registrar]\n"));
        assert!(md.contains("- **Username**: admin\n"));
        assert!(!md.contains("S3cr3t!pw"));
        assert!(!md.contains("998877"));
    }

    #[test]
    fn kb_content_uses_longer_cap() {
        let collections = Collections {
            kbs: vec![Kb {
                id: 1,
                name: Some("Backups".into()),
                description: Some("z".repeat(600)),
                ..Kb::default()
            }],
            ..Collections::default()
        };

        let md = render_snapshot(&collections, at());
        let expected = format!("- **Content**: {}…\n", "z".repeat(500));
        assert!(md.contains(&expected));
    }

    #[test]
    fn contact_without_name_falls_back_to_id() {
        let collections = Collections {
            contacts: vec![Contact {
                id: 17,
                email: Some("ops@example.com".into()),
                ..Contact::default()
            }],
            ..Collections::default()
        };

        let md = render_snapshot(&collections, at());
        assert!(md.contains("### Contact #17 (ID: 17)\n- **Email**: ops@example.com\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let collections = Collections {
            companies: vec![Company {
                id: 1,
                name: Some("Acme".into()),
                notes: Some("n".repeat(400)),
                ..Company::default()
            }],
            ip_networks: vec![IpNetwork {
                id: 2,
                name: Some("LAN".into()),
                network: Some("10.0.0.0".into()),
                subnet_mask: Some("255.255.255.0".into()),
                vlan_id: Some(10),
                ..IpNetwork::default()
            }],
            ..Collections::default()
        };

        let a = render_snapshot(&collections, at());
        let b = render_snapshot(&collections.clone(), at());
        assert_eq!(a, b);
        assert!(a.contains("- **Network**: 10.0.0.0 / 255.255.255.0\n- **VLAN**: 10\n"));
    }

    // ── Credentials ─────────────────────────────────────────────────

    #[test]
    fn credential_renderers_omit_secrets() {
        let creds = vec![Credential {
            id: 1,
            username: Some("root".into()),
            password: Some("pa55word".into()),
            two_fa_code: Some("424242".into()),
            description: Some("iDRAC".into()),
            domain: None,
        }];
        let md = render_credentials(&creds);
        assert_eq!(md, "### iDRAC (ID: 1)\n- **Username**: root\n\n");

        let extra = vec![AdditionalCredential {
            id: 2,
            url: Some("https://vpn.example.com".into()),
            username: Some("svc".into()),
            password: Some("hunter2".into()),
            description: None,
        }];
        let md = render_additional_credentials(&extra);
        assert!(md.starts_with("## Additional Credentials (1)\n\n### Credential #2 (ID: 2)\n"));
        assert!(md.contains("- **URL**: https://vpn.example.com\n"));
        assert!(!md.contains("hunter2"));
    }
}
