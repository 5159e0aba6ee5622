use anyhow::{Result, anyhow};
use chrono::NaiveDateTime;
use csv::WriterBuilder;

use crate::model::attendance::AttendanceWithUser;

/// Export column order is part of the report contract; consumers parse
/// positionally.
const HEADER: [&str; 9] = [
    "employeeId",
    "name",
    "email",
    "department",
    "date",
    "status",
    "checkInTime",
    "checkOutTime",
    "totalHours",
];

fn format_time(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Serialize joined attendance rows to CSV text. An empty record set still
/// yields the header line, matching the empty-report download behavior.
pub fn attendance_csv(records: &[AttendanceWithUser]) -> Result<String> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(vec![]);

    writer.write_record(HEADER)?;

    for record in records {
        let check_in = format_time(record.check_in_time);
        let check_out = format_time(record.check_out_time);
        let total_hours = record.total_hours.to_string();

        writer.write_record([
            record.employee_code.as_str(),
            record.name.as_str(),
            record.email.as_str(),
            record.department.as_deref().unwrap_or(""),
            record.date.as_str(),
            record.status.as_str(),
            check_in.as_str(),
            check_out.as_str(),
            total_hours.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("CSV flush failed: {}", e))?;

    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row() -> AttendanceWithUser {
        AttendanceWithUser {
            id: 1,
            user_id: 7,
            date: "2026-08-06".to_owned(),
            check_in_time: NaiveDate::from_ymd_opt(2026, 8, 6)
                .unwrap()
                .and_hms_opt(9, 30, 0),
            check_out_time: NaiveDate::from_ymd_opt(2026, 8, 6)
                .unwrap()
                .and_hms_opt(17, 45, 0),
            status: "present".to_owned(),
            total_hours: 8.25,
            created_at: None,
            employee_code: "EMP001".to_owned(),
            name: "John Doe".to_owned(),
            email: "john.doe@company.com".to_owned(),
            department: Some("Engineering".to_owned()),
        }
    }

    #[test]
    fn empty_export_is_just_the_header() {
        let csv = attendance_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "employeeId,name,email,department,date,status,checkInTime,checkOutTime,totalHours\n"
        );
    }

    #[test]
    fn rows_keep_the_fixed_column_order() {
        let csv = attendance_csv(&[row()]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "EMP001,John Doe,john.doe@company.com,Engineering,2026-08-06,present,\
             2026-08-06 09:30:00,2026-08-06 17:45:00,8.25"
        );
    }

    #[test]
    fn missing_times_and_department_serialize_empty() {
        let mut r = row();
        r.check_in_time = None;
        r.check_out_time = None;
        r.department = None;
        r.status = "absent".to_owned();
        r.total_hours = 0.0;

        let csv = attendance_csv(&[r]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[1],
            "EMP001,John Doe,john.doe@company.com,,2026-08-06,absent,,,0"
        );
    }
}
