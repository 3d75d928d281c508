use bitflags::bitflags;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

///field names match what the booking site's JS has always consumed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Student {
    #[serde(rename = "student_id")]
    pub id: i32,
    pub user_id: Uuid,
    #[serde(rename = "student_first_name")]
    pub first_name: String,
    #[serde(rename = "student_last_name")]
    pub last_name: String,
    #[serde(rename = "student_dob")]
    pub date_of_birth: Option<NaiveDate>,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub county: String,
    pub postcode: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn address(&self) -> String {
        let mut parts = vec![self.address1.as_str()];
        if let Some(address2) = self.address2.as_deref() {
            parts.push(address2);
        }
        parts.extend([self.city.as_str(), self.county.as_str(), self.postcode.as_str()]);
        parts.join(", ")
    }
}

#[derive(Debug, Clone)]
pub struct AddStudent {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub county: String,
    pub postcode: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct NewStudentForm {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    pub city: String,
    pub county: String,
    pub postcode: String,
}

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct StudentDetailsError: u16 {
        const EMPTY_FIRST_NAME =   0b0000_0000_0000_0001;
        const EMPTY_LAST_NAME =    0b0000_0000_0000_0010;
        const EMPTY_ADDRESS =      0b0000_0000_0000_0100;
        const EMPTY_CITY =         0b0000_0000_0000_1000;
        const EMPTY_COUNTY =       0b0000_0000_0001_0000;
        const EMPTY_POSTCODE =     0b0000_0000_0010_0000;

        const BAD_DATE_OF_BIRTH =  0b0000_0001_0000_0000;
        const FUTURE_DATE_OF_BIRTH = 0b0000_0010_0000_0000;
    }
}

impl StudentDetailsError {
    pub fn as_nice_list(&self) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(|x| match x {
            Self::EMPTY_FIRST_NAME => Some("Provided first name was empty"),
            Self::EMPTY_LAST_NAME => Some("Provided last name was empty"),
            Self::EMPTY_ADDRESS => Some("Provided first address line was empty"),
            Self::EMPTY_CITY => Some("Provided city was empty"),
            Self::EMPTY_COUNTY => Some("Provided county was empty"),
            Self::EMPTY_POSTCODE => Some("Provided postcode was empty"),
            Self::BAD_DATE_OF_BIRTH => Some("Date of birth wasn't a valid date"),
            Self::FUTURE_DATE_OF_BIRTH => Some("Date of birth was in the future"),
            _ => None,
        })
    }
}

impl NewStudentForm {
    pub fn validate(self, user_id: Uuid, today: NaiveDate) -> Result<AddStudent, StudentDetailsError> {
        let trimmed = |s: String| s.trim().to_string();
        let Self {
            first_name,
            last_name,
            date_of_birth,
            address1,
            address2,
            city,
            county,
            postcode,
        } = self;
        let (first_name, last_name, address1, city, county, postcode) = (
            trimmed(first_name),
            trimmed(last_name),
            trimmed(address1),
            trimmed(city),
            trimmed(county),
            trimmed(postcode),
        );

        let mut errors = StudentDetailsError::empty();
        for (value, flag) in [
            (&first_name, StudentDetailsError::EMPTY_FIRST_NAME),
            (&last_name, StudentDetailsError::EMPTY_LAST_NAME),
            (&address1, StudentDetailsError::EMPTY_ADDRESS),
            (&city, StudentDetailsError::EMPTY_CITY),
            (&county, StudentDetailsError::EMPTY_COUNTY),
            (&postcode, StudentDetailsError::EMPTY_POSTCODE),
        ] {
            if value.is_empty() {
                errors |= flag;
            }
        }

        let date_of_birth = date_of_birth.trim();
        let date_of_birth = if date_of_birth.is_empty() {
            None
        } else if let Ok(dob) = NaiveDate::parse_from_str(date_of_birth, "%Y-%m-%d") {
            if dob > today {
                errors |= StudentDetailsError::FUTURE_DATE_OF_BIRTH;
            }
            Some(dob)
        } else {
            errors |= StudentDetailsError::BAD_DATE_OF_BIRTH;
            None
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let address2 = address2.trim();
        let address2 = if address2.is_empty() {
            None
        } else {
            Some(address2.to_string())
        };

        Ok(AddStudent {
            user_id,
            first_name,
            last_name,
            date_of_birth,
            address1,
            address2,
            city,
            county,
            postcode,
        })
    }
}
