//! Rate lookup: `POST /rs/ship/price`.

use super::{
    parse_document, write_parcel_characteristics, CanadaPostClient, RATE_MEDIA_TYPE,
    RATE_NAMESPACE,
};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Destination, Origin, Parcel, Service};

impl CanadaPostClient {
    pub fn build_get_rates(
        &self,
        parcel: &Parcel,
        origin: &Origin,
        destination: &Destination,
    ) -> Result<HttpRequest, ApiError> {
        let mut w = self.writer()?;
        w.root("mailing-scenario", RATE_NAMESPACE, |w| {
            w.text("customer-number", &self.config.customer_number)?;
            w.opt_text("contract-id", self.config.contract_number.as_deref())?;
            write_parcel_characteristics(w, parcel, false)?;
            w.text("origin-postal-code", &origin.postal_code)?;
            w.element("destination", |w| match destination.country_code.as_str() {
                _ if destination.is_domestic() => w.element("domestic", |w| {
                    w.text("postal-code", &destination.postal_code)
                }),
                "US" => w.element("united-states", |w| {
                    w.text("zip-code", &destination.postal_code)
                }),
                country => w.element("international", |w| w.text("country-code", country)),
            })
        })?;
        Ok(self.post(self.rating_url(), RATE_MEDIA_TYPE, w.finish()?))
    }

    /// One `Service` per `price-quote`; an empty list when nothing matches.
    pub fn parse_get_rates(&self, response: HttpResponse) -> Result<Vec<Service>, ApiError> {
        let root = parse_document(&response)?;
        root.children_named("price-quote")
            .map(Service::from_xml)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::super::tests::{client, domestic, origin, response};
    use crate::error::ApiError;
    use crate::http::HttpMethod;
    use crate::types::{Address, Parcel};
    use crate::xml;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn domestic_request_with_dimensions() {
        let parcel = Parcel::new(dec("1.5")).with_dimensions(dec("30"), dec("20"), dec("10"));
        let req = client().build_get_rates(&parcel, &origin(), &domestic()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://ct.soa-gw.canadapost.ca/rs/ship/price");
        assert_eq!(req.header("Content-Type"), Some(super::RATE_MEDIA_TYPE));

        let doc = xml::parse(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(doc.name, "mailing-scenario");
        assert_eq!(doc.child_text("customer-number"), Some("0001234567"));
        assert_eq!(doc.child_text("contract-id"), Some("0040000000"));
        assert_eq!(doc.path(&["parcel-characteristics", "weight"]).unwrap().text, "1.5");
        assert_eq!(
            doc.path(&["parcel-characteristics", "dimensions", "height"]).unwrap().text,
            "10"
        );
        assert_eq!(doc.child_text("origin-postal-code"), Some("K1A0B1"));
        assert_eq!(
            doc.path(&["destination", "domestic", "postal-code"]).unwrap().text,
            "V6B1A1"
        );
    }

    #[test]
    fn dimensions_omitted_unless_all_positive() {
        let parcel = Parcel::new(dec("2")).with_dimensions(dec("30"), Decimal::ZERO, dec("10"));
        let req = client().build_get_rates(&parcel, &origin(), &domestic()).unwrap();
        let doc = xml::parse(req.body.as_deref().unwrap()).unwrap();
        assert!(doc.path(&["parcel-characteristics", "dimensions"]).is_none());
    }

    #[test]
    fn us_destination_uses_zip_code_inside_destination() {
        let dest = Address::builder("90210").build_destination("US").unwrap();
        let req = client()
            .build_get_rates(&Parcel::new(Decimal::ONE), &origin(), &dest)
            .unwrap();
        let doc = xml::parse(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            doc.path(&["destination", "united-states", "zip-code"]).unwrap().text,
            "90210"
        );
        assert!(doc.child("united-states").is_none());
    }

    #[test]
    fn international_destination_sends_country_only() {
        let dest = Address::builder("75008").build_destination("FR").unwrap();
        let req = client()
            .build_get_rates(&Parcel::new(Decimal::ONE), &origin(), &dest)
            .unwrap();
        let doc = xml::parse(req.body.as_deref().unwrap()).unwrap();
        let intl = doc.path(&["destination", "international"]).unwrap();
        assert_eq!(intl.child_text("country-code"), Some("FR"));
        assert!(intl.child("postal-code").is_none());
    }

    #[test]
    fn minimal_addresses_never_fail_validation() {
        let origin = Address::builder("K1A0B1").build_origin().unwrap();
        for country in ["CA", "US", "JP"] {
            let dest = Address::builder("12345").build_destination(country).unwrap();
            assert!(client()
                .build_get_rates(&Parcel::new(Decimal::ONE), &origin, &dest)
                .is_ok());
        }
    }

    #[test]
    fn parses_quotes() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
            <price-quotes xmlns="http://www.canadapost.ca/ws/ship/rate">
              <price-quote>
                <service-code>DOM.EP</service-code>
                <service-name>Expedited Parcel</service-name>
                <price-details>
                  <base>9.59</base>
                  <taxes><gst percent="5">0.48</gst><pst>0</pst><hst>0</hst></taxes>
                  <due>10.07</due>
                </price-details>
                <service-standard><expected-transit-time>1</expected-transit-time></service-standard>
              </price-quote>
              <price-quote>
                <service-code>DOM.PC</service-code>
                <service-name>Priority</service-name>
                <price-details><base>22.64</base><due>23.77</due></price-details>
              </price-quote>
            </price-quotes>"#;
        let services = client().parse_get_rates(response(200, body)).unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].code, "DOM.EP");
        assert_eq!(services[0].price.tax_total(), dec("0.48"));
        assert_eq!(services[0].transit_time, Some(1));
        assert_eq!(services[1].price.due, dec("23.77"));
        assert!(services[1].transit_time.is_none());
    }

    #[test]
    fn empty_quote_list_is_ok() {
        let services = client()
            .parse_get_rates(response(200, "<price-quotes/>"))
            .unwrap();
        assert!(services.is_empty());
    }

    #[test]
    fn error_status_is_http_error() {
        let err = client()
            .parse_get_rates(response(400, "<messages><message><code>E001</code></message></messages>"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
    }

    fn arb_country() -> impl Strategy<Value = String> {
        prop_oneof![Just("CA".to_string()), Just("US".to_string()), "[A-Z]{2}"]
    }

    /// Either one line or two space-free words that only fit once split.
    fn arb_street() -> impl Strategy<Value = String> {
        prop_oneof![
            "[A-Za-z0-9 ]{1,44}",
            ("[A-Za-z0-9]{1,43}", "[A-Za-z0-9]{1,44}")
                .prop_map(|(a, b)| format!("{a} {b}"))
                .prop_filter("must need a split", |s| s.chars().count() > 44),
        ]
    }

    proptest! {
        #[test]
        fn builder_accepted_addresses_always_rate(
            country in arb_country(),
            postal_code in "[A-Za-z0-9 ]{0,10}",
            name in "[A-Za-z .'-]{1,44}",
            phone in "[0-9 ()+-]{7,20}",
            street in arb_street(),
            city in "[A-Za-z ]{1,40}",
            province in "[A-Z]{2}",
            grams in 1u32..30_000,
        ) {
            let origin = Address::builder("K1A 0B1")
                .company(name.clone())
                .phone(phone.clone())
                .street(street.clone())
                .city(city.clone())
                .province("ON")
                .build_origin();
            prop_assert!(origin.is_ok(), "{:?}", origin);
            let destination = Address::builder(&postal_code)
                .name(name)
                .phone(phone)
                .street(street)
                .city(city)
                .province(province)
                .build_destination(&country);
            prop_assert!(destination.is_ok(), "{:?}", destination);

            let parcel = Parcel::new(Decimal::new(i64::from(grams), 3));
            let req = client().build_get_rates(&parcel, &origin.unwrap(), &destination.unwrap());
            prop_assert!(req.is_ok(), "{:?}", req);

            let doc = xml::parse(req.unwrap().body.as_deref().unwrap()).unwrap();
            let block = match country.as_str() {
                "CA" => "domestic",
                "US" => "united-states",
                _ => "international",
            };
            prop_assert!(doc.path(&["destination", block]).is_some());
        }
    }
}
