// src/hr_client_tests.rs

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use super::super::hr_client::{
        BreakDefinition, BulkBreakPayload, BulkDeletePayload, BulkShiftPayload, HrApiClient,
        HrApiConfig, HrApiError,
    };

    fn test_config() -> HrApiConfig {
        HrApiConfig {
            base_url: "https://hr-backend.test/api/v1".to_string(),
            auth_token: "test_token".to_string(),
            admin_emp_id: "A001".to_string(),
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn test_client_construction_with_valid_config() {
        let client = HrApiClient::new(test_config()).expect("client should build");
        assert_eq!(client.admin_emp_id(), "A001");
    }

    #[test]
    fn test_client_rejects_empty_base_url() {
        let result = HrApiClient::new(HrApiConfig::default());
        match result {
            Err(HrApiError::Config(_)) => (),
            other => panic!("Expected Config error but got: {:?}", other.err()),
        }
    }

    #[test]
    fn test_client_rejects_unparseable_base_url() {
        let config = HrApiConfig {
            base_url: "not a url".to_string(),
            ..test_config()
        };
        let result = HrApiClient::new(config);
        match result {
            Err(HrApiError::UrlParse(_)) => (),
            other => panic!("Expected UrlParse error but got: {:?}", other.err()),
        }
    }

    // The backend contract is field-name sensitive; these pin the exact wire
    // shapes.

    #[test]
    fn test_bulk_shift_payload_wire_shape() {
        let payload = BulkShiftPayload {
            array_employee_emp_id: vec!["E100".to_string(), "E200".to_string()],
            admin_emp_id: "A001".to_string(),
            shift_in: "08:00".to_string(),
            shift_out: "17:00".to_string(),
            array_selected_days: vec!["2024-06-12".to_string()],
            schedule_type_id: "1".to_string(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "array_employee_emp_id": ["E100", "E200"],
                "admin_emp_id": "A001",
                "shift_in": "08:00",
                "shift_out": "17:00",
                "array_selected_days": ["2024-06-12"],
                "schedule_type_id": "1",
            })
        );
    }

    #[test]
    fn test_bulk_break_payload_wire_shape() {
        let payload = BulkBreakPayload {
            array_employee_emp_id: vec!["E100".to_string()],
            admin_emp_id: "A001".to_string(),
            array_selected_days: vec!["2024-06-12".to_string()],
            array_break: vec![BreakDefinition {
                name: "LUNCH BREAK".to_string(),
                shift_in: "12:00".to_string(),
                shift_out: "13:00".to_string(),
                schedule_type: "5".to_string(),
            }],
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "array_employee_emp_id": ["E100"],
                "admin_emp_id": "A001",
                "array_selected_days": ["2024-06-12"],
                "array_break": [{
                    "name": "LUNCH BREAK",
                    "shift_in": "12:00",
                    "shift_out": "13:00",
                    "schedule_type": "5",
                }],
            })
        );
    }

    #[test]
    fn test_bulk_delete_payload_wire_shape() {
        let payload = BulkDeletePayload {
            array_employee_emp_id: vec!["E100".to_string()],
            array_selected_days: vec!["2024-06-12".to_string()],
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "array_employee_emp_id": ["E100"],
                "array_selected_days": ["2024-06-12"],
            })
        );
    }

    #[test]
    fn test_api_error_display_includes_status_and_message() {
        let error = HrApiError::Api {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "employee not under this supervisor".to_string(),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("422"));
        assert!(rendered.contains("employee not under this supervisor"));
    }
}
