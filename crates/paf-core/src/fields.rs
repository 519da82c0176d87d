use chrono::{Local, NaiveDate};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::contact::extract_phone_and_name;
use crate::record::Record;

/// Date format used when the caller supplies no date.
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// The placeholders a PAF template may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    FullName,
    ChineseName,
    Dob,
    Address,
    Language,
    MedicaidId,
    Gender,
    Pcp,
    Name,
    CurrentDate,
    CompanyId,
    Company,
    Phone,
    MedicareId,
    EmergencyPhone,
}

impl Placeholder {
    pub const ALL: [Placeholder; 15] = [
        Placeholder::FullName,
        Placeholder::ChineseName,
        Placeholder::Dob,
        Placeholder::Address,
        Placeholder::Language,
        Placeholder::MedicaidId,
        Placeholder::Gender,
        Placeholder::Pcp,
        Placeholder::Name,
        Placeholder::CurrentDate,
        Placeholder::CompanyId,
        Placeholder::Company,
        Placeholder::Phone,
        Placeholder::MedicareId,
        Placeholder::EmergencyPhone,
    ];

    /// Literal token text, braces included.
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::FullName => "{FULL_NAME}",
            Placeholder::ChineseName => "{CHINESE_NAME}",
            Placeholder::Dob => "{DOB}",
            Placeholder::Address => "{ADDRESS}",
            Placeholder::Language => "{LANGUAGE}",
            Placeholder::MedicaidId => "{MEDICAID_ID}",
            Placeholder::Gender => "{GENDER}",
            Placeholder::Pcp => "{PCP}",
            Placeholder::Name => "{NAME}",
            Placeholder::CurrentDate => "{CURRENT_DATE}",
            Placeholder::CompanyId => "{COMPANY_ID}",
            Placeholder::Company => "{COMPANY}",
            Placeholder::Phone => "{PHONE}",
            Placeholder::MedicareId => "{MEDICARE_ID}",
            Placeholder::EmergencyPhone => "{EMERGENCY_PHONE}",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }
}

/// Ordered placeholder → display value mapping for one fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(Placeholder, String)>,
}

fn coerce(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl FieldMap {
    /// Render every placeholder from `record`.
    ///
    /// `date` is used verbatim for `{CURRENT_DATE}`; without one, today's
    /// local date is rendered as `MM/DD/YYYY`.
    pub fn build(record: &Record, date: Option<&str>) -> Self {
        Self::build_with_today(record, date, Local::now().date_naive())
    }

    pub fn build_with_today(record: &Record, date: Option<&str>, today: NaiveDate) -> Self {
        let emergency = coerce(&record.emergency);
        let (emergency_phone, contact_name) = extract_phone_and_name(&emergency);

        let home_tel = coerce(&record.home_tel);
        let phone = if home_tel.is_empty() { coerce(&record.cell) } else { home_tel };

        let current_date = match date {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => today.format(DEFAULT_DATE_FORMAT).to_string(),
        };

        // A missing first name still leaves the separating space in place.
        let full_name = format!("{} {}", coerce(&record.first_name), coerce(&record.last_name));

        let entries = Placeholder::ALL
            .into_iter()
            .map(|placeholder| {
                let value = match placeholder {
                    Placeholder::FullName => full_name.clone(),
                    Placeholder::ChineseName => coerce(&record.chinese_name),
                    Placeholder::Dob => coerce(&record.dob),
                    Placeholder::Address => coerce(&record.address),
                    Placeholder::Language => coerce(&record.language),
                    Placeholder::MedicaidId => coerce(&record.medicaid),
                    Placeholder::Gender => coerce(&record.gender),
                    Placeholder::Pcp => coerce(&record.pcp),
                    Placeholder::Name => contact_name.clone(),
                    Placeholder::CurrentDate => current_date.clone(),
                    Placeholder::CompanyId => coerce(&record.member_id),
                    Placeholder::Company => coerce(&record.health_plan),
                    Placeholder::Phone => phone.clone(),
                    Placeholder::MedicareId => coerce(&record.medicare),
                    Placeholder::EmergencyPhone => emergency_phone.clone().unwrap_or_default(),
                };
                (placeholder, value)
            })
            .collect();

        Self { entries }
    }

    pub fn value(&self, placeholder: Placeholder) -> &str {
        self.entries
            .iter()
            .find(|(p, _)| *p == placeholder)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    /// Value for a literal token such as `"{DOB}"`.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p.token() == token)
            .map(|(_, v)| v.as_str())
    }

    /// `(token, value)` pairs in placeholder order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(p, v)| (p.token(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (token, value) in self.iter() {
            map.serialize_entry(token, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CenterId;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    fn record() -> Record {
        Record {
            center_id: Some(CenterId(100)),
            first_name: Some("Mei".into()),
            last_name: Some("Chan".into()),
            chinese_name: Some("陳美".into()),
            dob: Some("1948-03-09".into()),
            emergency: Some("Liu, Leslie-daughter-9175139188".into()),
            member_id: Some("M-778".into()),
            health_plan: Some("VNS Choice".into()),
            home_tel: Some("7185550100".into()),
            cell: Some("6465550199".into()),
            ..Record::default()
        }
    }

    #[test]
    fn test_exactly_fifteen_tokens() {
        let fields = FieldMap::build_with_today(&record(), Some("01/02/2025"), today());
        assert_eq!(fields.len(), 15);
        let tokens: Vec<_> = fields.iter().map(|(t, _)| t).collect();
        assert_eq!(tokens[0], "{FULL_NAME}");
        assert_eq!(tokens[14], "{EMERGENCY_PHONE}");
    }

    #[test]
    fn test_derived_fields() {
        let fields = FieldMap::build_with_today(&record(), Some("01-02-2025"), today());
        assert_eq!(fields.get("{FULL_NAME}"), Some("Mei Chan"));
        assert_eq!(fields.get("{NAME}"), Some("Liu,Lesliedaughter"));
        assert_eq!(fields.get("{EMERGENCY_PHONE}"), Some("9175139188"));
        assert_eq!(fields.get("{COMPANY_ID}"), Some("M-778"));
        assert_eq!(fields.get("{COMPANY}"), Some("VNS Choice"));
        assert_eq!(fields.get("{CURRENT_DATE}"), Some("01-02-2025"));
        assert_eq!(fields.get("{ADDRESS}"), Some(""));
        assert_eq!(fields.get("{UNKNOWN}"), None);
    }

    #[test]
    fn test_phone_prefers_home_tel() {
        let fields = FieldMap::build_with_today(&record(), None, today());
        assert_eq!(fields.value(Placeholder::Phone), "7185550100");

        let mut no_home = record();
        no_home.home_tel = Some(String::new());
        let fields = FieldMap::build_with_today(&no_home, None, today());
        assert_eq!(fields.value(Placeholder::Phone), "6465550199");

        no_home.home_tel = None;
        let fields = FieldMap::build_with_today(&no_home, None, today());
        assert_eq!(fields.value(Placeholder::Phone), "6465550199");
    }

    #[test]
    fn test_missing_first_name_keeps_space() {
        let mut r = record();
        r.first_name = None;
        let fields = FieldMap::build_with_today(&r, None, today());
        assert_eq!(fields.value(Placeholder::FullName), " Chan");
    }

    #[test]
    fn test_date_fallback() {
        let fields = FieldMap::build_with_today(&record(), None, today());
        assert_eq!(fields.value(Placeholder::CurrentDate), "01/02/2025");
        let fields = FieldMap::build_with_today(&record(), Some(""), today());
        assert_eq!(fields.value(Placeholder::CurrentDate), "01/02/2025");
    }

    #[test]
    fn test_missing_emergency() {
        let mut r = record();
        r.emergency = None;
        let fields = FieldMap::build_with_today(&r, None, today());
        assert_eq!(fields.value(Placeholder::Name), "");
        assert_eq!(fields.value(Placeholder::EmergencyPhone), "");
    }

    #[test]
    fn test_serializes_in_order() {
        let fields = FieldMap::build_with_today(&record(), Some("x"), today());
        let json = serde_json::to_string(&fields).unwrap();
        assert!(json.starts_with(r#"{"{FULL_NAME}":"Mei Chan","{CHINESE_NAME}":"陳美""#));
    }

    #[test]
    fn test_placeholder_tokens_round_trip() {
        for p in Placeholder::ALL {
            assert_eq!(Placeholder::from_token(p.token()), Some(p));
        }
        assert_eq!(Placeholder::from_token("FULL_NAME"), None);
    }
}
