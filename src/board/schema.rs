use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyAction, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

const COMPANY_TABLE_V_0: Table = Table {
    name: "company",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("description", &SqlType::Text, non_null = true),
        sqlite_column!("website", &SqlType::Text),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("owner_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_company_owner", "owner_id")],
};

const CATEGORY_TABLE_V_0: Table = Table {
    name: "category",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    unique_constraints: &[],
    indices: &[],
};

const LOCATION_TABLE_V_0: Table = Table {
    name: "location",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    unique_constraints: &[],
    indices: &[],
};

const SKILL_TABLE_V_0: Table = Table {
    name: "skill",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    unique_constraints: &[],
    indices: &[],
};

const JOB_TABLE_V_0: Table = Table {
    name: "job",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!(
            "company_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "company",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("author_id", &SqlType::Integer, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text, non_null = true),
        sqlite_column!("employment_type", &SqlType::Text, non_null = true),
        sqlite_column!("salary_min", &SqlType::Integer),
        sqlite_column!("salary_max", &SqlType::Integer),
        sqlite_column!(
            "category_id",
            &SqlType::Integer,
            foreign_key = Some(&ForeignKey {
                foreign_table: "category",
                foreign_column: "id",
                on_delete: ForeignKeyAction::SetNull,
            })
        ),
        sqlite_column!(
            "location_id",
            &SqlType::Integer,
            foreign_key = Some(&ForeignKey {
                foreign_table: "location",
                foreign_column: "id",
                on_delete: ForeignKeyAction::SetNull,
            })
        ),
        sqlite_column!("status", &SqlType::Integer, non_null = true),
        sqlite_column!("deadline", &SqlType::Integer),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[
        ("idx_job_company", "company_id"),
        ("idx_job_status", "status"),
        ("idx_job_author", "author_id"),
    ],
};

const JOB_SKILL_TABLE_V_0: Table = Table {
    name: "job_skill",
    columns: &[
        sqlite_column!(
            "job_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "job",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!(
            "skill_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "skill",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
    ],
    unique_constraints: &[&["job_id", "skill_id"]],
    indices: &[],
};

const APPLICATION_TABLE_V_0: Table = Table {
    name: "application",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!(
            "job_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "job",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("candidate_id", &SqlType::Integer, non_null = true),
        sqlite_column!("cover_letter", &SqlType::Text),
        sqlite_column!("status", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["job_id", "candidate_id"]],
    indices: &[("idx_application_candidate", "candidate_id")],
};

const JOB_COMMENT_TABLE_V_0: Table = Table {
    name: "job_comment",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!(
            "job_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "job",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("author_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "parent_id",
            &SqlType::Text,
            foreign_key = Some(&ForeignKey {
                foreign_table: "job_comment",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("body", &SqlType::Text, non_null = true),
        sqlite_column!("edited", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_job_comment_job", "job_id")],
};

const COMPANY_REVIEW_TABLE_V_0: Table = Table {
    name: "company_review",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!(
            "company_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "company",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("author_id", &SqlType::Integer, non_null = true),
        sqlite_column!("rating", &SqlType::Integer, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("body", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["company_id", "author_id"]],
    indices: &[("idx_company_review_company", "company_id")],
};

pub const BOARD_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        COMPANY_TABLE_V_0,
        CATEGORY_TABLE_V_0,
        LOCATION_TABLE_V_0,
        SKILL_TABLE_V_0,
        JOB_TABLE_V_0,
        JOB_SKILL_TABLE_V_0,
        APPLICATION_TABLE_V_0,
        JOB_COMMENT_TABLE_V_0,
        COMPANY_REVIEW_TABLE_V_0,
    ],
    migration: None,
}];
