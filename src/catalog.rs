//! # Company Template Catalog
//!
//! Static tenant profiles the operator starts an invoice from. Reference
//! data only: defined here at build time, looked up by id, never mutated
//! at runtime.

use serde::Serialize;

use crate::invoice::BillDefaults;

/// An immutable tenant profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub recipient_name: &'static str,
    pub address_line1: &'static str,
    pub address_line2: &'static str,
    pub address_line3: &'static str,
    pub gst_number: &'static str,
    pub rented_area: f64,
    pub rent_rate: f64,
    pub sgst_rate: f64,
    pub cgst_rate: f64,
    pub ref_number_prefix: &'static str,
}

impl CompanyTemplate {
    /// Fold the template into the assembly fallback shape.
    pub fn defaults(&self) -> BillDefaults {
        BillDefaults {
            recipient_name: self.recipient_name.to_string(),
            address_line1: self.address_line1.to_string(),
            address_line2: self.address_line2.to_string(),
            address_line3: self.address_line3.to_string(),
            gst_number: self.gst_number.to_string(),
            rented_area: self.rented_area,
            rent_rate: self.rent_rate,
            sgst_rate: self.sgst_rate,
            cgst_rate: self.cgst_rate,
            ref_number_prefix: self.ref_number_prefix.to_string(),
        }
    }
}

/// A `{value, label}` pair for template pickers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateOption {
    pub value: &'static str,
    pub label: &'static str,
}

const TEMPLATES: &[CompanyTemplate] = &[
    CompanyTemplate {
        id: "sagar-trading",
        label: "Sagar Trading Co.",
        recipient_name: "Sagar Trading Co.",
        address_line1: "Gala No. 7, Laxmi Compound",
        address_line2: "Vasai East",
        address_line3: "Palghar - 401208",
        gst_number: "27AACCS8294K1Z5",
        rented_area: 25000.0,
        rent_rate: 18.0,
        sgst_rate: 9.0,
        cgst_rate: 9.0,
        ref_number_prefix: "SAGT",
    },
    CompanyTemplate {
        id: "nexval-logistics",
        label: "Nexval Logistics Pvt. Ltd.",
        recipient_name: "Nexval Logistics Pvt. Ltd.",
        address_line1: "Warehouse B-3, Karjat Road",
        address_line2: "Bhiwandi",
        address_line3: "Thane - 421302",
        gst_number: "27AADCN7310M1ZQ",
        rented_area: 12000.0,
        rent_rate: 22.0,
        sgst_rate: 9.0,
        cgst_rate: 9.0,
        ref_number_prefix: "NEXV",
    },
    CompanyTemplate {
        id: "medirex-pharma",
        label: "Medirex Pharma Distributors",
        recipient_name: "Medirex Pharma Distributors",
        address_line1: "Shed 12, Hariom Industrial Estate",
        address_line2: "Goregaon West",
        address_line3: "Mumbai - 400062",
        gst_number: "27AAHFM2958C1Z8",
        rented_area: 8500.0,
        rent_rate: 26.0,
        sgst_rate: 9.0,
        cgst_rate: 9.0,
        ref_number_prefix: "MDRX",
    },
];

/// Every template, in catalog order.
pub fn templates() -> &'static [CompanyTemplate] {
    TEMPLATES
}

/// Look a template up by id.
pub fn template_by_id(id: &str) -> Option<&'static CompanyTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// `{value, label}` pairs for UI selection, in catalog order.
pub fn template_options() -> Vec<TemplateOption> {
    TEMPLATES
        .iter()
        .map(|t| TemplateOption {
            value: t.id,
            label: t.label,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_by_id() {
        let template = template_by_id("sagar-trading").unwrap();
        assert_eq!(template.recipient_name, "Sagar Trading Co.");
        assert_eq!(template.rented_area, 25000.0);
        assert_eq!(template.rent_rate, 18.0);
        assert!(template_by_id("missing").is_none());
    }

    #[test]
    fn test_options_preserve_catalog_order() {
        let options = template_options();
        assert_eq!(options.len(), templates().len());
        assert_eq!(options[0].value, "sagar-trading");
        assert_eq!(options[0].label, "Sagar Trading Co.");
        assert_eq!(options[2].value, "medirex-pharma");
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = templates().iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), templates().len());
    }

    #[test]
    fn test_defaults_carry_all_fields() {
        let defaults = template_by_id("nexval-logistics").unwrap().defaults();
        assert_eq!(defaults.gst_number, "27AADCN7310M1ZQ");
        assert_eq!(defaults.ref_number_prefix, "NEXV");
        assert_eq!(defaults.sgst_rate, 9.0);
    }
}
