// SQL query constants for repositories
// Centralizes repeated column lists; numeric columns are projected as text to keep exact precision

/// SQL query fragments for jobs table
pub mod job_queries {
    /// Job columns aliased to record field names
    pub const RETURNING_COLUMNS: &str =
        r#"id, title, salary, equity::text AS equity, company_handle AS "companyHandle""#;

    /// Listing columns, joined with companies for the display name
    pub const SUMMARY_SELECT: &str = r#"SELECT j.id,
                j.title,
                j.salary,
                j.equity::text AS equity,
                j.company_handle AS "companyHandle",
                c.name AS "companyName"
         FROM jobs j
         LEFT JOIN companies AS c ON c.handle = j.company_handle"#;
}

/// SQL query fragments for companies table
pub mod company_queries {
    pub const SELECT_ALL_COLUMNS: &str =
        r#"handle, name, description, num_employees AS "numEmployees", logo_url AS "logoUrl""#;
}

/// SQL query fragments for users table
pub mod user_queries {
    /// Public user columns. The password hash is never part of this list.
    pub const PUBLIC_COLUMNS: &str = r#"username,
                first_name AS "firstName",
                last_name AS "lastName",
                email,
                is_admin AS "isAdmin""#;
}
