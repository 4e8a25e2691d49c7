use serde::Serialize;

use crate::application::upload::Submission;

/// Stands in for the file name and path when no attachment was uploaded.
pub const NO_FILE_SENTINEL: &str = "No file uploaded";

/// The flat set of form values plus file metadata for one submission.
/// Built per request and dropped once its PDF is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub job_role: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub date: String,
    pub file_name: String,
    pub file_path: String,
}

impl ApplicationRecord {
    /// Assembles a record from the received form. Absent fields become empty strings.
    pub fn from_submission(submission: &Submission) -> Self {
        let (file_name, file_path) = match &submission.file {
            Some(file) => (
                file.original_name.clone(),
                file.path.display().to_string(),
            ),
            None => (NO_FILE_SENTINEL.to_string(), NO_FILE_SENTINEL.to_string()),
        };

        ApplicationRecord {
            first_name: submission.field("first_name"),
            last_name: submission.field("last_name"),
            email: submission.field("email"),
            job_role: submission.field("job_role"),
            address: submission.field("address"),
            city: submission.field("city"),
            pincode: submission.field("pincode"),
            date: submission.field("date"),
            file_name,
            file_path,
        }
    }

    /// Label/value pairs in the order they are printed on the document.
    pub fn labeled_fields(&self) -> [(&'static str, &str); 10] {
        [
            ("First Name", self.first_name.as_str()),
            ("Last Name", self.last_name.as_str()),
            ("Email", self.email.as_str()),
            ("Job Role", self.job_role.as_str()),
            ("Address", self.address.as_str()),
            ("City", self.city.as_str()),
            ("Pincode", self.pincode.as_str()),
            ("Date", self.date.as_str()),
            ("File Name", self.file_name.as_str()),
            ("File Path", self.file_path.as_str()),
        ]
    }
}
