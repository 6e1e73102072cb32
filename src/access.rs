use crate::attendance::repository::PersonDirectory;
use crate::database::models::Person;
use crate::error::{AttendanceError, AttendanceResult};
use tracing::warn;

/// Resolves the requester and admits them only if they hold the `ADMIN` role.
/// Reporting operations assume this check has already happened.
pub async fn require_admin(
    directory: &dyn PersonDirectory,
    requester_id: &str,
) -> AttendanceResult<Person> {
    let person = directory
        .get_person(requester_id)
        .await?
        .ok_or_else(|| {
            AttendanceError::Unauthorized(format!("unknown requester {}", requester_id))
        })?;

    if !person.is_admin() {
        warn!(person_id = %person.id, "Non-admin requested attendance report");
        return Err(AttendanceError::Unauthorized(format!(
            "{} does not have the ADMIN role",
            person.id
        )));
    }

    Ok(person)
}
