//! Tool schemas advertised to the completion service.

use serde_json::{json, Value};

/// The three scheduling tools, in OpenAI function-calling format.
pub fn tool_schemas() -> Vec<Value> {
    vec![
        json!({
            "type": "function",
            "function": {
                "name": "identify_provider",
                "description": "Identify the best healthcare provider based on the patient's health issue. Use this when the patient describes their symptoms or health concern.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "health_issue": {
                            "type": "string",
                            "description": "The patient's health issue or symptoms"
                        },
                        "patient_name": {
                            "type": "string",
                            "description": "The patient's name if provided"
                        }
                    },
                    "required": ["health_issue"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "check_availability",
                "description": "Check the availability of a specific provider. Use this when you need to find available appointment times.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "provider_id": {
                            "type": "string",
                            "description": "The ID of the provider to check availability for"
                        },
                        "preferred_dates": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Optional list of preferred dates in YYYY-MM-DD format"
                        },
                        "time_preference": {
                            "type": "string",
                            "enum": ["morning", "afternoon", "any"],
                            "description": "Time of day preference: 'morning' (before 12 PM), 'afternoon' (12 PM or later), or 'any'"
                        },
                        "num_days": {
                            "type": "integer",
                            "description": "Number of days to look ahead (default: 7)"
                        }
                    },
                    "required": ["provider_id"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "create_appointment",
                "description": "Create an appointment for the patient. Use this when the patient has confirmed all details (provider, date, and time).",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "patient_name": {
                            "type": "string",
                            "description": "The patient's full name"
                        },
                        "provider_id": {
                            "type": "string",
                            "description": "The ID of the provider"
                        },
                        "date": {
                            "type": "string",
                            "description": "Appointment date in YYYY-MM-DD format"
                        },
                        "time": {
                            "type": "string",
                            "description": "Appointment time in HH:MM format (24-hour)"
                        },
                        "reason": {
                            "type": "string",
                            "description": "Reason for the appointment"
                        }
                    },
                    "required": ["patient_name", "provider_id", "date", "time"]
                }
            }
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_tools_advertised() {
        let tools = tool_schemas();
        assert_eq!(tools.len(), 3);
        let names: Vec<&str> = tools
            .iter()
            .map(|t| t["function"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["identify_provider", "check_availability", "create_appointment"]
        );
    }

    #[test]
    fn test_required_fields_match_contract() {
        let tools = tool_schemas();
        assert_eq!(
            tools[0]["function"]["parameters"]["required"],
            json!(["health_issue"])
        );
        assert_eq!(
            tools[2]["function"]["parameters"]["required"],
            json!(["patient_name", "provider_id", "date", "time"])
        );
    }
}
