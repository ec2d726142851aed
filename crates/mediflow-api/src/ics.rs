//! iCalendar export for appointments.
//!
//! Emits a minimal single-event VCALENDAR. Events are 30 minutes, times are
//! floating local time, and lines are CRLF-terminated per RFC 5545.

use chrono::{Duration, NaiveTime, Utc};

use mediflow_core::types::Appointment;

const DT_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Escape text for an iCalendar property value.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace(';', "\\;")
        .replace('\n', "\\n")
}

/// Render an appointment as VCALENDAR text.
pub fn generate_ics(appointment: &Appointment) -> String {
    let start = NaiveTime::parse_from_str(&appointment.time, "%H:%M")
        .map(|t| appointment.date.and_time(t))
        .unwrap_or_else(|_| appointment.date.and_hms_opt(9, 0, 0).unwrap_or_default());
    let end = start + Duration::minutes(30);

    let mut description = format!(
        "Patient: {}\nProvider: {}",
        appointment.patient_name, appointment.provider_name
    );
    if let Some(reason) = &appointment.reason {
        description.push_str(&format!("\nReason: {}", reason));
    }

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "PRODID:-//Mediflow Scheduler//EN".to_string(),
        "VERSION:2.0".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", appointment.id),
        format!("DTSTAMP:{}", Utc::now().format("%Y%m%dT%H%M%SZ")),
        format!("DTSTART:{}", start.format(DT_FORMAT)),
        format!("DTEND:{}", end.format(DT_FORMAT)),
        format!(
            "SUMMARY:{}",
            escape(&format!("Appointment with {}", appointment.provider_name))
        ),
        format!("LOCATION:{}", escape(&appointment.location)),
        format!("DESCRIPTION:{}", escape(&description)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn appointment() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_name: "Jane Doe".to_string(),
            provider_id: "p001".to_string(),
            provider_name: "Dr. Sarah Chen".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            time: "09:45".to_string(),
            location: "Downtown Medical Center".to_string(),
            reason: Some("rash, itchy".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_event_spans_thirty_minutes() {
        let ics = generate_ics(&appointment());
        assert!(ics.contains("DTSTART:20260106T094500"));
        assert!(ics.contains("DTEND:20260106T101500"));
    }

    #[test]
    fn test_calendar_envelope_and_uid() {
        let appt = appointment();
        let ics = generate_ics(&appt);
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains(&format!("UID:{}", appt.id)));
        assert!(ics.contains("SUMMARY:Appointment with Dr. Sarah Chen"));
    }

    #[test]
    fn test_description_escapes_commas_and_newlines() {
        let ics = generate_ics(&appointment());
        assert!(ics.contains("DESCRIPTION:Patient: Jane Doe\\nProvider: Dr. Sarah Chen\\nReason: rash\\, itchy"));
    }

    #[test]
    fn test_unparsable_time_falls_back_to_morning() {
        let mut appt = appointment();
        appt.time = "whenever".to_string();
        let ics = generate_ics(&appt);
        assert!(ics.contains("DTSTART:20260106T090000"));
    }
}
