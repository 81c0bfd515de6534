/// Static catalogue of the logical data sources a data access node may name:
/// underlying table, retrievable columns, and which column carries team vs
/// user ownership. A source with neither ownership column is only useful
/// under the platform-wide scope (shared reference data).
#[derive(Debug, Clone, Copy)]
pub struct DataSourceConfig {
    pub table: &'static str,
    pub select: &'static [&'static str],
    pub team_column: Option<&'static str>,
    pub user_column: Option<&'static str>,
    pub label: &'static str,
}

pub fn data_source_config(name: &str) -> Option<&'static DataSourceConfig> {
    DATA_SOURCES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, config)| config)
}

/// Display label for the scope sentence; unknown sources fall back to the
/// raw name so a miscatalogued node still renders its instruction text.
pub fn data_source_label(name: &str) -> &str {
    data_source_config(name).map(|c| c.label).unwrap_or(name)
}

static DATA_SOURCES: &[(&str, DataSourceConfig)] = &[
    (
        "business_info",
        DataSourceConfig {
            table: "business_info",
            select: &[
                "id",
                "user_id",
                "full_name",
                "business_name",
                "email",
                "phone_number",
                "payment_option",
                "payment_remaining",
                "command_hq_link",
                "command_hq_created",
                "gd_folder_created",
                "meeting_scheduled",
                "created_at",
                "updated_at",
                "profile_picture_url",
                "role",
                "google_review_link",
                "team_id",
                "permissions",
                "job_title",
                "manager",
                "critical_accountabilities",
                "playbooks_owned",
                "department",
                "manager_id",
                "department_id",
                "wbt_onboarding",
            ],
            team_column: Some("team_id"),
            user_column: Some("user_id"),
            label: "Business info",
        },
    ),
    (
        "business_owner_instructions",
        DataSourceConfig {
            table: "business_owner_instructions",
            select: &[
                "id",
                "user_id",
                "title",
                "content",
                "content_type",
                "url",
                "extraction_metadata",
                "created_at",
                "updated_at",
            ],
            team_column: None,
            user_column: Some("user_id"),
            label: "Business owner instructions",
        },
    ),
    (
        "company_onboarding",
        DataSourceConfig {
            table: "company_onboarding",
            select: &[
                "id",
                "user_id",
                "onboarding_data",
                "completed",
                "competitor_data",
                "created_at",
                "updated_at",
            ],
            team_column: None,
            user_column: Some("user_id"),
            label: "Company onboarding",
        },
    ),
    (
        "departments",
        DataSourceConfig {
            table: "departments",
            select: &["id", "name", "team_id", "created_at", "updated_at"],
            team_column: Some("team_id"),
            user_column: None,
            label: "Departments",
        },
    ),
    (
        "finance_analysis",
        DataSourceConfig {
            table: "finance_analysis",
            select: &[
                "id",
                "file_id",
                "user_id",
                "team_id",
                "analysis_result",
                "summary",
                "status",
                "created_at",
                "updated_at",
                "period_type",
            ],
            team_column: Some("team_id"),
            user_column: Some("user_id"),
            label: "Finance analysis",
        },
    ),
    (
        "google_calendar_events",
        DataSourceConfig {
            table: "google_calendar_events",
            select: &[
                "id",
                "user_id",
                "title",
                "description",
                "location",
                "start_time",
                "end_time",
                "all_day",
                "status",
                "created_at",
                "updated_at",
            ],
            team_column: None,
            user_column: Some("user_id"),
            label: "Google Calendar events",
        },
    ),
    (
        "global_services",
        DataSourceConfig {
            table: "global_services",
            select: &[
                "id",
                "service_name",
                "description",
                "category",
                "is_active",
                "created_at",
                "updated_at",
                "display_order",
            ],
            team_column: None,
            user_column: None,
            label: "Global services",
        },
    ),
    (
        "leave_approvals",
        DataSourceConfig {
            table: "leave_approvals",
            select: &[
                "id",
                "leave_id",
                "approver_id",
                "action",
                "comments",
                "created_at",
            ],
            team_column: None,
            user_column: Some("approver_id"),
            label: "Leave approvals",
        },
    ),
    (
        "leave_entitlements",
        DataSourceConfig {
            table: "leave_entitlements",
            select: &[
                "id",
                "team_id",
                "total_entitlement_days",
                "year",
                "created_at",
                "updated_at",
            ],
            team_column: Some("team_id"),
            user_column: None,
            label: "Leave entitlements",
        },
    ),
    (
        "machines",
        DataSourceConfig {
            table: "machines",
            select: &[
                "id",
                "user_id",
                "enginename",
                "enginetype",
                "description",
                "triggeringevents",
                "endingevent",
                "actionsactivities",
                "created_at",
                "updated_at",
                "figma_link",
                "figma_embed",
                "image_url",
                "image_urls",
                "welcome_completed",
                "questions",
                "answers",
                "questions_completed",
                "ai_assisted",
                "service_name",
                "service_id",
                "subcategory_id",
                "team_service_id",
            ],
            team_column: None,
            user_column: Some("user_id"),
            label: "Machines / value engines",
        },
    ),
    (
        "performance_kpis",
        DataSourceConfig {
            table: "performance_kpis",
            select: &[
                "id",
                "session_id",
                "revenue",
                "revenue_status",
                "ad_spend",
                "leads",
                "jobs_completed",
                "roas",
                "roi_pounds",
                "roi_percent",
                "google_reviews",
                "created_at",
                "updated_at",
            ],
            team_column: None,
            user_column: None,
            label: "Performance KPIs",
        },
    ),
    (
        "playbook_assignments",
        DataSourceConfig {
            table: "playbook_assignments",
            select: &["id", "user_id", "playbook_id", "assignment_type", "created_at"],
            team_column: None,
            user_column: None,
            label: "Playbook assignments",
        },
    ),
    (
        "software",
        DataSourceConfig {
            table: "software",
            select: &[
                "id",
                "software",
                "url",
                "description",
                "price_monthly",
                "department_id",
                "team_id",
                "pricing_period",
                "created_at",
                "updated_at",
            ],
            team_column: Some("team_id"),
            user_column: None,
            label: "Software",
        },
    ),
    (
        "sop_data",
        DataSourceConfig {
            table: "sop_data",
            select: &[
                "id",
                "user_id",
                "title",
                "content",
                "version",
                "is_current",
                "created_at",
                "updated_at",
                "metadata",
            ],
            team_column: None,
            user_column: Some("user_id"),
            label: "SOP data",
        },
    ),
    (
        "tasks",
        DataSourceConfig {
            table: "tasks",
            select: &[
                "id",
                "title",
                "description",
                "links",
                "task_type",
                "status",
                "priority",
                "start_date",
                "due_date",
                "assigned_to",
                "created_by",
                "team_id",
                "created_at",
                "updated_at",
            ],
            team_column: Some("team_id"),
            user_column: Some("assigned_to"),
            label: "Tasks",
        },
    ),
    (
        "team_leaves",
        DataSourceConfig {
            table: "team_leaves",
            select: &[
                "id",
                "user_id",
                "leave_type",
                "start_date",
                "end_date",
                "status",
                "duration_days",
                "description",
                "created_at",
                "updated_at",
            ],
            team_column: None,
            user_column: Some("user_id"),
            label: "Team leaves",
        },
    ),
    (
        "team_services",
        DataSourceConfig {
            table: "team_services",
            select: &["id", "team_id", "service_id", "created_at", "updated_at"],
            team_column: Some("team_id"),
            user_column: None,
            label: "Team services",
        },
    ),
    (
        "battle_plan",
        DataSourceConfig {
            table: "battle_plan",
            select: &[
                "id",
                "user_id",
                "businessplanlink",
                "missionstatement",
                "visionstatement",
                "purposewhy",
                "strategicanchors",
                "corevalues",
                "business_plan_content",
                "oneyeartarget",
                "tenyeartarget",
                "fiveyeartarget",
                "static_questions_answers",
                "created_at",
                "updated_at",
            ],
            team_column: None,
            user_column: Some("user_id"),
            label: "Battle plan",
        },
    ),
    (
        "playbooks",
        DataSourceConfig {
            table: "playbooks",
            select: &[
                "id",
                "user_id",
                "playbookname",
                "description",
                "enginetype",
                "status",
                "link",
                "department_id",
                "content",
                "created_at",
                "updated_at",
            ],
            team_column: None,
            user_column: Some("user_id"),
            label: "Playbooks",
        },
    ),
];
