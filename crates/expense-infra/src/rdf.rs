//! RDF projections of gateway types.
//!
//! Typed resources travel as Turtle. Reading parses the whole document
//! with oxigraph and keeps the triples whose subject is the resource being
//! read; writing builds triples and hands them to oxigraph's serializer.
//! Only the predicates listed in [`vocab`] are read; everything else in a
//! document is ignored.
//!
//! A document that does not describe the requested expense as a
//! `schema:Invoice` is rejected rather than read as an empty expense, so a
//! read-modify-write never replaces stored fields with nothing.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{Literal, NamedNode, Subject, Term, Triple};
use url::Url;

use expense_types::error::PodError;
use expense_types::expense::Expense;
use expense_types::profile::WebIdProfile;

/// Namespaces and schema.org local names.
pub mod vocab {
    pub const SCHEMA: &str = "https://schema.org/";
    /// Older documents use the plain-http namespace; both are read.
    pub const SCHEMA_HTTP: &str = "http://schema.org/";

    pub const INVOICE: &str = "Invoice";
    pub const PROVIDER: &str = "provider";
    pub const PURCHASE_DATE: &str = "purchaseDate";
    pub const DESCRIPTION: &str = "description";
    pub const TOTAL_PAYMENT_DUE: &str = "totalPaymentDue";
    pub const PRICE_CURRENCY: &str = "priceCurrency";
    pub const CATEGORY: &str = "category";
    pub const IMAGE: &str = "image";

    pub const PIM_STORAGE: &str = "http://www.w3.org/ns/pim/space#storage";
    pub const SOLID_STORAGE: &str = "http://www.w3.org/ns/solid/terms#storage";

    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
}

const DATE_FORMAT: &str = "%Y-%m-%d";

fn schema(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{}{local}", vocab::SCHEMA))
}

/// schema.org local name of an IRI, for either namespace.
fn schema_local(iri: &str) -> Option<&str> {
    iri.strip_prefix(vocab::SCHEMA)
        .or_else(|| iri.strip_prefix(vocab::SCHEMA_HTTP))
}

fn malformed(message: String) -> PodError {
    PodError::MalformedPayload(message)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Triples describing an expense.
pub fn expense_triples(expense: &Expense) -> Vec<Triple> {
    let subject = NamedNode::new_unchecked(expense.identifier.as_str());
    let mut triples = vec![Triple::new(
        subject.clone(),
        rdf::TYPE,
        schema(vocab::INVOICE),
    )];
    let mut add = |local: &str, object: Term| {
        triples.push(Triple::new(subject.clone(), schema(local), object));
    };

    if let Some(provider) = &expense.merchant_provider {
        add(vocab::PROVIDER, Literal::new_simple_literal(provider).into());
    }
    if let Some(date) = &expense.expense_date {
        let value = date.format(DATE_FORMAT).to_string();
        add(vocab::PURCHASE_DATE, Literal::new_typed_literal(value, xsd::DATE).into());
    }
    if let Some(description) = &expense.description {
        add(vocab::DESCRIPTION, Literal::new_simple_literal(description).into());
    }
    if let Some(total) = expense.total {
        add(
            vocab::TOTAL_PAYMENT_DUE,
            Literal::new_typed_literal(total.to_string(), xsd::DECIMAL).into(),
        );
    }
    if let Some(currency) = &expense.currency {
        add(vocab::PRICE_CURRENCY, Literal::new_simple_literal(currency).into());
    }
    if let Some(category) = &expense.category {
        add(vocab::CATEGORY, Literal::new_simple_literal(category).into());
    }
    for receipt in &expense.receipts {
        add(vocab::IMAGE, NamedNode::new_unchecked(receipt.as_str()).into());
    }

    triples
}

/// Turtle document for an expense.
pub fn expense_to_turtle(expense: &Expense) -> Result<String, PodError> {
    let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle)
        .with_prefix("schema", vocab::SCHEMA)
        .and_then(|s| s.with_prefix("xsd", vocab::XSD))
        .map_err(|e| malformed(format!("invalid prefix: {e}")))?
        .for_writer(Vec::new());

    for triple in expense_triples(expense) {
        serializer
            .serialize_triple(&triple)
            .map_err(|e| malformed(format!("failed to write Turtle: {e}")))?;
    }
    let bytes = serializer
        .finish()
        .map_err(|e| malformed(format!("failed to write Turtle: {e}")))?;

    String::from_utf8(bytes).map_err(|e| malformed(format!("serializer produced non-UTF-8: {e}")))
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Parse a Turtle document, resolving relative IRIs against `base`.
pub fn parse_turtle(body: &[u8], base: &Url) -> Result<Vec<Triple>, PodError> {
    let parser = RdfParser::from_format(RdfFormat::Turtle)
        .with_base_iri(base.as_str())
        .map_err(|e| malformed(format!("invalid base IRI {base}: {e}")))?;

    parser
        .for_reader(body)
        .map(|quad| {
            quad.map(|q| Triple::new(q.subject, q.predicate, q.object))
                .map_err(|e| malformed(format!("{base} is not valid Turtle: {e}")))
        })
        .collect()
}

/// Whether `subject` names `resource`.
fn is_about(subject: &Subject, resource: &Url) -> bool {
    match subject {
        Subject::NamedNode(node) => Url::parse(node.as_str()).is_ok_and(|iri| iri == *resource),
        _ => false,
    }
}

fn literal_value(term: &Term) -> Option<&str> {
    match term {
        Term::Literal(literal) => Some(literal.value()),
        _ => None,
    }
}

fn iri_value(term: &Term) -> Result<Option<Url>, PodError> {
    match term {
        Term::NamedNode(node) => Url::parse(node.as_str())
            .map(Some)
            .map_err(|e| malformed(format!("bad IRI '{}': {e}", node.as_str()))),
        _ => Ok(None),
    }
}

/// Read the expense at `identifier` out of a Turtle document.
pub fn expense_from_turtle(body: &[u8], identifier: &Url) -> Result<Expense, PodError> {
    let triples = parse_turtle(body, identifier)?;
    let about: Vec<&Triple> = triples
        .iter()
        .filter(|t| is_about(&t.subject, identifier))
        .collect();

    let is_invoice = about.iter().any(|t| match &t.object {
        Term::NamedNode(class) => {
            t.predicate.as_ref() == rdf::TYPE
                && schema_local(class.as_str()) == Some(vocab::INVOICE)
        }
        _ => false,
    });
    if !is_invoice {
        return Err(malformed(format!(
            "{identifier} is not described as a schema:Invoice"
        )));
    }

    let mut expense = Expense::new(identifier.clone());
    for triple in about {
        let Some(local) = schema_local(triple.predicate.as_str()) else {
            continue;
        };
        let object = &triple.object;
        match local {
            vocab::PROVIDER => {
                if let Some(v) = literal_value(object) {
                    expense.merchant_provider = Some(v.to_string());
                }
            }
            vocab::DESCRIPTION => {
                if let Some(v) = literal_value(object) {
                    expense.description = Some(v.to_string());
                }
            }
            vocab::PRICE_CURRENCY => {
                if let Some(v) = literal_value(object) {
                    expense.currency = Some(v.to_string());
                }
            }
            vocab::CATEGORY => {
                if let Some(v) = literal_value(object) {
                    expense.category = Some(v.to_string());
                }
            }
            vocab::PURCHASE_DATE => {
                if let Some(raw) = literal_value(object) {
                    // dateTime values keep their date part.
                    let date_part = raw.split('T').next().unwrap_or(raw);
                    let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
                        .map_err(|e| malformed(format!("bad purchase date '{raw}': {e}")))?;
                    expense.expense_date = Some(date);
                }
            }
            vocab::TOTAL_PAYMENT_DUE => {
                if let Some(raw) = literal_value(object) {
                    let total = raw
                        .trim()
                        .parse::<f64>()
                        .map_err(|e| malformed(format!("bad total '{raw}': {e}")))?;
                    expense.total = Some(total);
                }
            }
            vocab::IMAGE => {
                if let Some(receipt) = iri_value(object)? {
                    expense.receipts.insert(receipt);
                }
            }
            _ => {}
        }
    }

    Ok(expense)
}

/// Read the storages a WebID declares out of its profile document.
pub fn profile_from_turtle(body: &[u8], webid: &Url) -> Result<WebIdProfile, PodError> {
    let triples = parse_turtle(body, webid)?;
    let about: Vec<&Triple> = triples
        .iter()
        .filter(|t| is_about(&t.subject, webid))
        .collect();
    if about.is_empty() {
        return Err(malformed(format!("profile document says nothing about {webid}")));
    }

    let mut storages = BTreeSet::new();
    for triple in about {
        let predicate = triple.predicate.as_str();
        if predicate == vocab::PIM_STORAGE || predicate == vocab::SOLID_STORAGE {
            if let Some(storage) = iri_value(&triple.object)? {
                storages.insert(storage);
            }
        }
    }

    let mut profile = WebIdProfile::new(webid.clone());
    profile.storages = storages;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn sample_expense() -> Expense {
        let mut expense = Expense::new(url("https://pod.example/expenses/1"));
        expense.merchant_provider = Some("Example Restaurant".to_string());
        expense.expense_date = NaiveDate::from_ymd_opt(2022, 12, 28);
        expense.description = Some("Team \"Lunch\"\non the terrace".to_string());
        expense.total = Some(100.5);
        expense.currency = Some("USD".to_string());
        expense.category = Some("Travel and Entertainment".to_string());
        expense.add_receipt(url("https://pod.example/receipts/r1.png"));
        expense
    }

    #[test]
    fn test_expense_survives_turtle_round_trip() {
        let expense = sample_expense();
        let turtle = expense_to_turtle(&expense).unwrap();

        assert!(turtle.contains("https://pod.example/expenses/1"));
        let read = expense_from_turtle(turtle.as_bytes(), &expense.identifier).unwrap();
        assert_eq!(read, expense);
    }

    #[test]
    fn test_reads_prefixed_document_with_relative_iris() {
        let doc = r#"
            @prefix schema: <http://schema.org/> .
            @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

            <> a schema:Invoice ;
                schema:description "Team Lunch" ;
                schema:totalPaymentDue 12.5 ;
                schema:purchaseDate "2023-01-02T10:00:00Z"^^xsd:dateTime ;
                schema:image <../receipts/a.jpg> ;
                <https://example.org/unknown> "ignored" .

            <../receipts/a.jpg> schema:description "not about the expense" .
        "#;

        let expense = expense_from_turtle(doc.as_bytes(), &url("https://pod.example/expenses/7"))
            .unwrap();
        assert_eq!(expense.description.as_deref(), Some("Team Lunch"));
        assert_eq!(expense.total, Some(12.5));
        assert_eq!(expense.expense_date, NaiveDate::from_ymd_opt(2023, 1, 2));
        assert!(expense.receipts.contains(&url("https://pod.example/receipts/a.jpg")));
        assert!(expense.category.is_none());
    }

    #[test]
    fn test_json_ld_body_is_malformed_not_empty() {
        let body = br#"{
            "@context": { "schema": "https://schema.org/" },
            "@id": "https://pod.example/expenses/1",
            "@type": "schema:Invoice",
            "schema:description": "Team Lunch",
            "schema:totalPaymentDue": 12.5
        }"#;
        let err = expense_from_turtle(body, &url("https://pod.example/expenses/1")).unwrap_err();
        assert!(matches!(err, PodError::MalformedPayload(_)));
    }

    #[test]
    fn test_document_without_invoice_is_malformed() {
        let doc = br#"<https://pod.example/expenses/1> <https://schema.org/description> "x" ."#;
        let err = expense_from_turtle(doc, &url("https://pod.example/expenses/1")).unwrap_err();
        assert!(matches!(err, PodError::MalformedPayload(_)));

        let other = br#"<https://pod.example/other> a <https://schema.org/Invoice> ."#;
        let err = expense_from_turtle(other, &url("https://pod.example/expenses/1")).unwrap_err();
        assert!(matches!(err, PodError::MalformedPayload(_)));
    }

    #[test]
    fn test_bad_total_is_malformed() {
        let doc = br#"<https://pod.example/expenses/1> a <https://schema.org/Invoice> ;
            <https://schema.org/totalPaymentDue> "lots" ."#;
        let err = expense_from_turtle(doc, &url("https://pod.example/expenses/1")).unwrap_err();
        assert!(matches!(err, PodError::MalformedPayload(_)));
    }

    #[test]
    fn test_profile_storages() {
        let webid = url("https://alice.pod.example/profile/card#me");
        let doc = br#"
            @prefix pim: <http://www.w3.org/ns/pim/space#> .
            @prefix solid: <http://www.w3.org/ns/solid/terms#> .

            <> a <http://xmlns.com/foaf/0.1/PersonalProfileDocument> .
            <#me> pim:storage </>, <https://backup.example/alice/> ;
                solid:storage </> .
        "#;

        let profile = profile_from_turtle(doc, &webid).unwrap();
        assert_eq!(profile.webid, webid);
        assert_eq!(profile.storages.len(), 2);
        assert!(profile.storages.contains(&url("https://alice.pod.example/")));
        assert!(profile.storages.contains(&url("https://backup.example/alice/")));
    }

    #[test]
    fn test_profile_without_webid_is_malformed() {
        let doc =
            br#"<https://alice.pod.example/profile/card> a <http://xmlns.com/foaf/0.1/Document> ."#;
        let err = profile_from_turtle(doc, &url("https://alice.pod.example/profile/card#me"))
            .unwrap_err();
        assert!(matches!(err, PodError::MalformedPayload(_)));
    }
}
