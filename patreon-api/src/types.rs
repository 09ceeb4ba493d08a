//! Campaign-member types: the JSON:API wire documents and the flattened
//! [`Patron`] records built from them.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Membership status reported by Patreon for a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatronStatus {
    /// Currently pledging.
    ActivePatron,
    /// Last charge was declined.
    DeclinedPatron,
    /// Used to pledge.
    FormerPatron,
    /// Null or a status this client does not know about.
    Other,
}

impl PatronStatus {
    /// Map the raw `patron_status` attribute.
    pub fn from_api(raw: Option<&str>) -> Self {
        match raw {
            Some("active_patron") => Self::ActivePatron,
            Some("declined_patron") => Self::DeclinedPatron,
            Some("former_patron") => Self::FormerPatron,
            _ => Self::Other,
        }
    }

    /// Only active patrons count toward anniversaries and tier occupancy.
    pub fn is_active(self) -> bool {
        self == Self::ActivePatron
    }

    /// The raw attribute value, `None` for [`PatronStatus::Other`].
    pub fn as_api(self) -> Option<&'static str> {
        match self {
            Self::ActivePatron => Some("active_patron"),
            Self::DeclinedPatron => Some("declined_patron"),
            Self::FormerPatron => Some("former_patron"),
            Self::Other => None,
        }
    }
}

impl fmt::Display for PatronStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api().unwrap_or("other"))
    }
}

/// One campaign member, flattened from a JSON:API member resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patron {
    /// Stable Patreon member id.
    pub member_id: String,
    /// Display name. Empty when Patreon returns null.
    pub full_name: String,
    /// Cumulative amount ever pledged.
    pub lifetime_support_cents: u64,
    pub patron_status: PatronStatus,
    /// Start of the current pledge relationship, in the offset Patreon reported.
    pub pledge_relationship_start: Option<DateTime<FixedOffset>>,
    pub currently_entitled_amount_cents: u64,
    pub currently_entitled_tier_ids: BTreeSet<String>,
}

impl Patron {
    /// A patron with no pledge history. Mostly useful for fixtures.
    pub fn new(member_id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            full_name: full_name.into(),
            lifetime_support_cents: 0,
            patron_status: PatronStatus::Other,
            pledge_relationship_start: None,
            currently_entitled_amount_cents: 0,
            currently_entitled_tier_ids: BTreeSet::new(),
        }
    }

    /// Whether the patron is entitled to the given tier.
    pub fn is_entitled_to(&self, tier_id: &str) -> bool {
        self.currently_entitled_tier_ids.contains(tier_id)
    }

    pub(crate) fn from_resource(resource: MemberResource) -> Self {
        let attributes = resource.attributes;
        let pledge_relationship_start = attributes
            .pledge_relationship_start
            .as_deref()
            .and_then(|raw| match DateTime::parse_from_rfc3339(raw) {
                Ok(start) => Some(start),
                Err(e) => {
                    tracing::warn!(
                        member_id = %resource.id,
                        raw,
                        "unparseable pledge_relationship_start: {e}"
                    );
                    None
                }
            });
        let currently_entitled_tier_ids = resource
            .relationships
            .currently_entitled_tiers
            .map(|rel| rel.data.into_iter().map(|tier| tier.id).collect())
            .unwrap_or_default();

        Self {
            member_id: resource.id,
            full_name: attributes.full_name.unwrap_or_default(),
            lifetime_support_cents: attributes.lifetime_support_cents.unwrap_or(0),
            patron_status: PatronStatus::from_api(attributes.patron_status.as_deref()),
            pledge_relationship_start,
            currently_entitled_amount_cents: attributes.currently_entitled_amount_cents.unwrap_or(0),
            currently_entitled_tier_ids,
        }
    }

    /// Rebuild the member resource this patron was flattened from.
    pub(crate) fn to_resource(&self) -> MemberResource {
        let tiers = self
            .currently_entitled_tier_ids
            .iter()
            .map(|id| ResourceIdentifier {
                id: id.clone(),
                kind: "tier".to_owned(),
            })
            .collect();

        MemberResource {
            id: self.member_id.clone(),
            kind: "member".to_owned(),
            attributes: MemberAttributes {
                full_name: Some(self.full_name.clone()),
                lifetime_support_cents: Some(self.lifetime_support_cents),
                patron_status: self.patron_status.as_api().map(str::to_owned),
                pledge_relationship_start: self
                    .pledge_relationship_start
                    .map(|start| start.to_rfc3339()),
                currently_entitled_amount_cents: Some(self.currently_entitled_amount_cents),
            },
            relationships: MemberRelationships {
                currently_entitled_tiers: Some(RelationshipList { data: tiers }),
            },
        }
    }
}

/// Everything one fetch cycle learned about the campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// All members across all pages, in response order.
    pub patrons: Vec<Patron>,
    /// Id of the tier whose amount equals the configured threshold, if any.
    pub fixed_tier_id: Option<String>,
}

/// One page of `GET /api/oauth2/v2/campaigns/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct MembersPage {
    pub data: Vec<MemberResource>,
    #[serde(default)]
    pub included: Vec<IncludedResource>,
    #[serde(default)]
    pub links: Option<PageLinks>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResource {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub attributes: MemberAttributes,
    #[serde(default)]
    pub relationships: MemberRelationships,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemberAttributes {
    pub full_name: Option<String>,
    pub lifetime_support_cents: Option<u64>,
    pub patron_status: Option<String>,
    pub pledge_relationship_start: Option<String>,
    pub currently_entitled_amount_cents: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemberRelationships {
    pub currently_entitled_tiers: Option<RelationshipList>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RelationshipList {
    #[serde(default)]
    pub data: Vec<ResourceIdentifier>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A resource from the `included` array. Only tiers are interpreted.
#[derive(Debug, Deserialize)]
pub struct IncludedResource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl IncludedResource {
    /// `amount_cents` when this resource is a tier that carries one.
    pub fn tier_amount_cents(&self) -> Option<u64> {
        if self.kind != "tier" {
            return None;
        }
        self.attributes
            .get("amount_cents")
            .and_then(serde_json::Value::as_u64)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageLinks {
    pub next: Option<String>,
}

/// Accumulates pages into a [`Snapshot`].
///
/// The fixed tier id is taken from the first page that includes a matching
/// tier; later pages never override it.
#[derive(Debug)]
pub struct SnapshotBuilder {
    fixed_tier_amount_cents: u64,
    snapshot: Snapshot,
    pages: usize,
}

impl SnapshotBuilder {
    pub fn new(fixed_tier_amount_cents: u64) -> Self {
        Self {
            fixed_tier_amount_cents,
            snapshot: Snapshot::default(),
            pages: 0,
        }
    }

    /// Absorb one page and return its `next` link, if any.
    pub fn absorb(&mut self, page: MembersPage) -> Option<String> {
        self.pages += 1;
        self.snapshot
            .patrons
            .extend(page.data.into_iter().map(Patron::from_resource));

        if self.snapshot.fixed_tier_id.is_none() {
            if let Some(tier) = page
                .included
                .iter()
                .find(|i| i.tier_amount_cents() == Some(self.fixed_tier_amount_cents))
            {
                tracing::info!(
                    tier_id = %tier.id,
                    amount_cents = self.fixed_tier_amount_cents,
                    "resolved fixed tier"
                );
                self.snapshot.fixed_tier_id = Some(tier.id.clone());
            }
        }

        tracing::debug!(
            page = self.pages,
            members = self.snapshot.patrons.len(),
            "absorbed members page"
        );

        page.links
            .and_then(|links| links.next)
            .filter(|next| !next.trim().is_empty())
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn finish(self) -> Snapshot {
        self.snapshot
    }
}
