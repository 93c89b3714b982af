//! Builders for the seeded resources.
//!
//! Everything here is pure: the fixed demo records are constants and the random ones are built
//! from a [`Person`] drawn by [`crate::synthesis::LookupDb`].

use crate::synthesis::{Person, PostalAddress};
use fhir::{
    AdministrativeGender, Address, Attachment, CodeableConcept, Coding, ContactPoint,
    ContactPointSystem, ContactPointUse, HoursOfOperation, HumanName, Identifier, Location,
    Patient, Period, Position, Practitioner, Qualification, Reference,
};

const SSN_SYSTEM: &str = "http://hl7.org/fhir/sid/us-ssn";
const CLINIC_PHONE: &str = "+11234567890";
const CLINIC_DESCRIPTION: &str = "Welcome to Coeus Chiropractic! Whether you're suffering \
debilitating pain from an injury, seek drug-free relief from the symptoms of a chronic condition, \
or just want to improve your overall state of health, you can benefit tremendously from meeting \
a skilled, experienced chiropractic team.";
const HEADSHOT_BASE_URL: &str =
    "https://s3.amazonaws.com/cdn.dfs.team/assets/chiropractor-headshots";
const HEADSHOT_COUNT: usize = 5;

struct Clinic {
    site: &'static str,
    aliases: &'static [&'static str],
    street: &'static str,
    city: &'static str,
    state: &'static str,
    postal_code: &'static str,
    longitude: f64,
    latitude: f64,
}

const CLINICS: [Clinic; 4] = [
    Clinic {
        site: "Atlanta",
        aliases: &["atlanta", "atl", "coeus atl"],
        street: "1526 Howell Mill Rd NW",
        city: "Atlanta",
        state: "GA",
        postal_code: "30318",
        longitude: -84.41641,
        latitude: 33.79696,
    },
    Clinic {
        site: "Sandy Springs",
        aliases: &["sandy springs", "coeus sandy springs"],
        street: "6111 Peachtree Dunwoody Road",
        city: "Sandy Springs",
        state: "GA",
        postal_code: "30328",
        longitude: -84.34953,
        latitude: 33.9217,
    },
    Clinic {
        site: "Fairfax",
        aliases: &["fairfax", "coeus fairfax"],
        street: "10640 Main St STE 103",
        city: "Fairfax",
        state: "VA",
        postal_code: "22030",
        longitude: -77.31305,
        latitude: 38.84863,
    },
    Clinic {
        site: "Haymarket",
        aliases: &["haymarket", "coeus haymarket"],
        street: "15100 Washington St",
        city: "Haymarket",
        state: "VA",
        postal_code: "20169",
        longitude: -77.63759,
        latitude: 38.81316,
    },
];

/// The four demo clinic sites.
pub fn clinic_locations() -> Vec<Location> {
    CLINICS.iter().map(clinic_location).collect()
}

fn clinic_location(clinic: &Clinic) -> Location {
    Location {
        status: Some("active".into()),
        name: Some(format!("Coeus Chiropractic - {}", clinic.site)),
        alias: clinic.aliases.iter().map(|a| a.to_string()).collect(),
        description: Some(CLINIC_DESCRIPTION.into()),
        telecom: vec![
            ContactPoint::new(ContactPointSystem::Phone, CLINIC_PHONE, ContactPointUse::Mobile)
                .ranked(1),
        ],
        address: Some(Address {
            use_type: Some("home".into()),
            type_: Some("physical".into()),
            text: Some(format!(
                "{}, {}, {} {}",
                clinic.street, clinic.city, clinic.state, clinic.postal_code
            )),
            city: Some(clinic.city.into()),
            state: Some(clinic.state.into()),
            postal_code: Some(clinic.postal_code.into()),
            country: Some("US".into()),
            ..Address::default()
        }),
        position: Some(Position {
            longitude: clinic.longitude,
            latitude: clinic.latitude,
        }),
        hours_of_operation: vec![HoursOfOperation {
            days_of_week: ["mon", "tue", "wed", "thu", "fri", "sat"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            all_day: None,
            opening_time: Some("09:00:00".into()),
            closing_time: Some("17:00:00".into()),
        }],
        ..Location::default()
    }
}

/// The fixed demo patient, Sarah Lee Baker.
pub fn demo_patient() -> Patient {
    Patient {
        identifier: vec![Identifier {
            system: Some(SSN_SYSTEM.into()),
            value: Some("111223456".into()),
        }],
        active: Some(true),
        name: vec![HumanName {
            use_type: Some("usual".into()),
            text: Some("Sarah Lee Baker".into()),
            family: Some("Baker".into()),
            given: vec!["Sarah".into()],
        }],
        telecom: vec![
            ContactPoint::new(ContactPointSystem::Phone, "+12223334444", ContactPointUse::Mobile),
            ContactPoint::new(
                ContactPointSystem::Email,
                "sarahbaker@example.com",
                ContactPointUse::Home,
            ),
        ],
        gender: Some(AdministrativeGender::Female),
        birth_date: Some("1984-04-02".into()),
        deceased_boolean: Some(false),
        address: vec![Address {
            use_type: Some("home".into()),
            line: vec!["123 Atlanta Ave SE".into()],
            city: Some("Atlanta".into()),
            state: Some("GA".into()),
            postal_code: Some("30315".into()),
            country: Some("US".into()),
            text: Some("123 Atlanta Ave SE, Atlanta, GA 30315".into()),
            ..Address::default()
        }],
        marital_status: Some(CodeableConcept {
            coding: vec![
                Coding {
                    system: Some("http://snomed.info/sct".into()),
                    code: Some("36629006".into()),
                    display: Some("Legally married".into()),
                },
                Coding {
                    system: Some("http://terminology.hl7.org/CodeSystem/v3-MaritalStatus".into()),
                    code: Some("M".into()),
                    display: None,
                },
            ],
            text: None,
        }),
        multiple_birth_boolean: Some(false),
        ..Patient::default()
    }
}

/// A random patient built from `person`.
pub fn random_patient(person: &Person) -> Patient {
    Patient {
        identifier: person
            .ssn
            .iter()
            .map(|ssn| Identifier {
                system: Some(SSN_SYSTEM.into()),
                value: Some(ssn.clone()),
            })
            .collect(),
        active: Some(true),
        name: vec![human_name(person, None)],
        telecom: vec![
            ContactPoint::new(
                ContactPointSystem::Phone,
                person.phone.clone(),
                ContactPointUse::Mobile,
            )
            .ranked(1),
            ContactPoint::new(ContactPointSystem::Email, person.email(), ContactPointUse::Home)
                .ranked(2),
        ],
        gender: Some(gender(person)),
        birth_date: Some(person.birth_date.clone()),
        address: vec![home_address(&person.address)],
        ..Patient::default()
    }
}

/// A random practitioner built from `person`. `index` picks the headshot.
pub fn practitioner(index: usize, person: &Person) -> Practitioner {
    let name = human_name(person, Some("Dr."));
    let display = name.text.clone().unwrap_or_default();

    Practitioner {
        identifier: vec![random_identifier()],
        active: Some(true),
        name: vec![name],
        telecom: vec![
            ContactPoint::new(
                ContactPointSystem::Phone,
                person.phone.clone(),
                ContactPointUse::Mobile,
            )
            .ranked(1),
        ],
        gender: Some(gender(person)),
        birth_date: Some(person.birth_date.clone()),
        photo: vec![Attachment {
            url: Some(headshot_url(index, person.is_male())),
            title: Some(format!("Headshot of {display}")),
        }],
        address: vec![home_address(&person.address)],
        qualification: vec![chiropractic_degree()],
        ..Practitioner::default()
    }
}

fn headshot_url(index: usize, male: bool) -> String {
    let n = index % HEADSHOT_COUNT + 1;
    if male {
        let ext = if n == HEADSHOT_COUNT { "jpeg" } else { "jpg" };
        format!("{HEADSHOT_BASE_URL}/male/{n}.{ext}")
    } else {
        format!("{HEADSHOT_BASE_URL}/female/{n}.jpg")
    }
}

fn chiropractic_degree() -> Qualification {
    Qualification {
        identifier: vec![random_identifier()],
        code: CodeableConcept {
            coding: vec![Coding {
                system: Some("http://terminology.hl7.org/CodeSystem/v2-0360/2.7".into()),
                code: Some("DC".into()),
                display: Some("Doctor of Chiropractic".into()),
            }],
            text: Some("Doctor of Chiropractic".into()),
        },
        period: Some(Period {
            start: Some("1995".into()),
            end: Some("1999".into()),
        }),
        issuer: Some(Reference {
            display: Some("Palmer College".into()),
            ..Reference::default()
        }),
    }
}

fn random_identifier() -> Identifier {
    Identifier {
        system: None,
        value: Some(uuid::Uuid::new_v4().to_string()),
    }
}

fn human_name(person: &Person, prefix: Option<&str>) -> HumanName {
    let full = format!("{} {}", person.first_name, person.last_name);
    HumanName {
        use_type: Some("usual".into()),
        text: Some(match prefix {
            Some(prefix) => format!("{prefix} {full}"),
            None => full,
        }),
        family: Some(person.last_name.clone()),
        given: person
            .first_name
            .split_whitespace()
            .map(str::to_string)
            .collect(),
    }
}

fn gender(person: &Person) -> AdministrativeGender {
    if person.is_male() {
        AdministrativeGender::Male
    } else {
        AdministrativeGender::Female
    }
}

fn home_address(address: &PostalAddress) -> Address {
    let mut line = vec![address.street.clone()];
    line.extend(address.street2.clone());
    Address {
        use_type: Some("home".into()),
        type_: Some("physical".into()),
        text: Some(format!(
            "{}, {}, {} {}",
            address.street, address.city, address.state_code, address.zip_code
        )),
        line,
        city: Some(address.city.clone()),
        state: Some(address.state_code.clone()),
        postal_code: Some(address.zip_code.clone()),
        country: Some("US".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person(first: &str, gender: &str) -> Person {
        Person {
            first_name: first.into(),
            last_name: "Okafor".into(),
            gender_code: Some(gender.into()),
            birth_date: "1971-09-30".into(),
            phone: "+17705550100".into(),
            ssn: Some("123456789".into()),
            address: PostalAddress {
                street: "42 Peachtree St".into(),
                street2: Some("Apt 3".into()),
                city: "Decatur".into(),
                state_code: "GA".into(),
                zip_code: "30030".into(),
            },
        }
    }

    #[test]
    fn demo_patient_wire_shape() {
        let value = serde_json::to_value(demo_patient()).expect("serialise");
        assert_eq!(value["resourceType"], "Patient");
        assert_eq!(value["name"][0]["text"], "Sarah Lee Baker");
        assert_eq!(value["telecom"][1]["value"], "sarahbaker@example.com");
        assert_eq!(value["maritalStatus"]["coding"][0]["code"], "36629006");
        assert_eq!(value["multipleBirthBoolean"], false);
        assert!(value.get("id").is_none());
    }

    #[test]
    fn four_active_clinics() {
        let clinics = clinic_locations();
        assert_eq!(clinics.len(), 4);
        assert!(clinics.iter().all(|c| c.status.as_deref() == Some("active")));

        let atlanta = serde_json::to_value(&clinics[0]).expect("serialise");
        assert_eq!(atlanta["name"], "Coeus Chiropractic - Atlanta");
        assert_eq!(atlanta["position"], json!({"longitude": -84.41641, "latitude": 33.79696}));
        assert_eq!(atlanta["hoursOfOperation"][0]["daysOfWeek"].as_array().map(Vec::len), Some(6));
        assert_eq!(atlanta["address"]["text"], "1526 Howell Mill Rd NW, Atlanta, GA 30318");
    }

    #[test]
    fn practitioner_is_a_doctor_with_headshot() {
        let doc = practitioner(4, &person("Ada Mae", "M"));
        assert_eq!(doc.name[0].text.as_deref(), Some("Dr. Ada Mae Okafor"));
        assert_eq!(doc.name[0].given, vec!["Ada", "Mae"]);
        assert_eq!(doc.gender, Some(AdministrativeGender::Male));
        assert_eq!(
            doc.photo[0].url.as_deref(),
            Some("https://s3.amazonaws.com/cdn.dfs.team/assets/chiropractor-headshots/male/5.jpeg")
        );
        assert_eq!(doc.photo[0].title.as_deref(), Some("Headshot of Dr. Ada Mae Okafor"));
        assert_eq!(doc.qualification[0].code.coding[0].code.as_deref(), Some("DC"));
    }

    #[test]
    fn headshots_cycle_by_index() {
        assert!(headshot_url(0, false).ends_with("/female/1.jpg"));
        assert!(headshot_url(7, false).ends_with("/female/3.jpg"));
        assert!(headshot_url(5, true).ends_with("/male/1.jpg"));
    }

    #[test]
    fn practitioners_get_distinct_identifiers() {
        let p = person("Lee", "F");
        assert_ne!(practitioner(0, &p).identifier, practitioner(0, &p).identifier);
    }

    #[test]
    fn random_patient_contacts_are_ranked() {
        let patient = random_patient(&person("Lee", "F"));
        let value = serde_json::to_value(&patient).expect("serialise");
        assert_eq!(value["identifier"][0]["system"], SSN_SYSTEM);
        assert_eq!(value["telecom"][0]["rank"], 1);
        assert_eq!(value["telecom"][1]["value"], "lokafor@example.com");
        assert_eq!(value["telecom"][1]["rank"], 2);
        assert_eq!(value["gender"], "female");
        assert_eq!(value["address"][0]["line"], json!(["42 Peachtree St", "Apt 3"]));
        assert_eq!(value["address"][0]["text"], "42 Peachtree St, Decatur, GA 30030");
    }
}
