use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};
use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};

use super::models::{Company, EmploymentType, Job, JobFilter, JobStatus};
use super::schema::BOARD_SCHEMAS;
use super::trait_def::{CompanyStore, JobStore};
use crate::applications::{Application, ApplicationStatus, ApplicationStore};
use crate::comments::{Comment, CommentStore};
use crate::reviews::{Review, ReviewAggregate, ReviewStore};
use crate::sqlite_persistence::open_versioned_database;

fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

const JOB_SELECT: &str = "SELECT j.id, j.company_id, j.author_id, j.title, j.description, \
     j.employment_type, j.salary_min, j.salary_max, c.name, l.name, j.status, j.deadline, \
     j.created, j.updated \
     FROM job j \
     LEFT JOIN category c ON c.id = j.category_id \
     LEFT JOIN location l ON l.id = j.location_id";

type JobRow = (
    String,
    String,
    i64,
    String,
    String,
    String,
    Option<i64>,
    Option<i64>,
    Option<String>,
    Option<String>,
    i32,
    Option<i64>,
    i64,
    i64,
);

fn read_job_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<JobRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
        row.get(13)?,
    ))
}

fn job_from_row(row: JobRow, skills: Vec<String>) -> Result<Job> {
    let (
        id,
        company_id,
        author_id,
        title,
        description,
        employment_type,
        salary_min,
        salary_max,
        category,
        location,
        status,
        deadline,
        created,
        updated,
    ) = row;
    Ok(Job {
        employment_type: EmploymentType::from_str(&employment_type)
            .with_context(|| format!("Unknown employment type '{}'", employment_type))?,
        status: JobStatus::from_int(status)
            .with_context(|| format!("Unknown job status {}", status))?,
        id,
        company_id,
        author_id: author_id as usize,
        title,
        description,
        salary_min: salary_min.map(|s| s as u32),
        salary_max: salary_max.map(|s| s as u32),
        category,
        location,
        skills,
        deadline,
        created,
        updated,
    })
}

/// Looks up the id of a named taxonomy row, creating it on first use.
fn get_or_create_named(conn: &Connection, table: &str, name: &str) -> Result<i64> {
    conn.execute(
        &format!("INSERT OR IGNORE INTO {} (name) VALUES (?1)", table),
        params![name],
    )?;
    let id = conn.query_row(
        &format!("SELECT id FROM {} WHERE name = ?1", table),
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

#[derive(Clone)]
pub struct SqliteBoardStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBoardStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_database(db_path, BOARD_SCHEMAS)?;
        Ok(SqliteBoardStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn job_skills(conn: &Connection, job_id: &str) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT s.name FROM job_skill js JOIN skill s ON s.id = js.skill_id
             WHERE js.job_id = ?1 ORDER BY s.name",
        )?;
        let skills = stmt
            .query_map(params![job_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(skills)
    }

    fn replace_job_skills(conn: &Connection, job_id: &str, skills: &[String]) -> Result<()> {
        conn.execute("DELETE FROM job_skill WHERE job_id = ?1", params![job_id])?;
        for skill in skills {
            let skill_id = get_or_create_named(conn, "skill", skill)?;
            conn.execute(
                "INSERT OR IGNORE INTO job_skill (job_id, skill_id) VALUES (?1, ?2)",
                params![job_id, skill_id],
            )?;
        }
        Ok(())
    }

    /// WHERE clause and arguments shared by the listing and count queries.
    fn filter_clauses(filter: &JobFilter) -> (String, Vec<Value>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(query) = &filter.query {
            let pattern = format!("%{}%", query);
            args.push(Value::Text(pattern.clone()));
            let idx = args.len();
            args.push(Value::Text(pattern));
            clauses.push(format!(
                "(j.title LIKE ?{} OR j.description LIKE ?{})",
                idx,
                idx + 1
            ));
        }
        if let Some(company_id) = &filter.company_id {
            args.push(Value::Text(company_id.clone()));
            clauses.push(format!("j.company_id = ?{}", args.len()));
        }
        if let Some(category) = &filter.category {
            args.push(Value::Text(category.clone()));
            clauses.push(format!(
                "j.category_id IN (SELECT id FROM category WHERE name = ?{})",
                args.len()
            ));
        }
        if let Some(location) = &filter.location {
            args.push(Value::Text(location.clone()));
            clauses.push(format!(
                "j.location_id IN (SELECT id FROM location WHERE name = ?{})",
                args.len()
            ));
        }
        if let Some(employment_type) = filter.employment_type {
            args.push(Value::Text(employment_type.as_str().to_string()));
            clauses.push(format!("j.employment_type = ?{}", args.len()));
        }
        if let Some(status) = filter.status {
            args.push(Value::Integer(status.as_int() as i64));
            clauses.push(format!("j.status = ?{}", args.len()));
        }
        if let Some(author_id) = filter.author_id {
            args.push(Value::Integer(author_id as i64));
            clauses.push(format!("j.author_id = ?{}", args.len()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        (where_clause, args)
    }
}

impl CompanyStore for SqliteBoardStore {
    fn add_company(&self, company: &Company) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO company (id, name, description, website, location, owner_id, created)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                company.id,
                company.name,
                company.description,
                company.website,
                company.location,
                company.owner_id as i64,
                company.created,
            ],
        )
        .with_context(|| format!("Failed to create company {}", company.name))?;
        Ok(())
    }

    fn get_company(&self, company_id: &str) -> Result<Option<Company>> {
        let conn = self.conn.lock().unwrap();
        let company = conn
            .query_row(
                "SELECT id, name, description, website, location, owner_id, created
                 FROM company WHERE id = ?1",
                params![company_id],
                |row| {
                    Ok(Company {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        website: row.get(3)?,
                        location: row.get(4)?,
                        owner_id: row.get::<_, i64>(5)? as usize,
                        created: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(company)
    }

    fn get_company_by_name(&self, name: &str) -> Result<Option<Company>> {
        let id: Option<String> = {
            let conn = self.conn.lock().unwrap();
            conn.query_row(
                "SELECT id FROM company WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?
        };
        match id {
            Some(id) => self.get_company(&id),
            None => Ok(None),
        }
    }

    fn update_company(&self, company: &Company) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE company SET name = ?1, description = ?2, website = ?3, location = ?4
             WHERE id = ?5",
            params![
                company.name,
                company.description,
                company.website,
                company.location,
                company.id,
            ],
        )?;
        Ok(())
    }

    fn get_companies(&self, limit: usize, offset: usize) -> Result<Vec<Company>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, website, location, owner_id, created
             FROM company ORDER BY name LIMIT ?1 OFFSET ?2",
        )?;
        let companies = stmt
            .query_map(params![limit as i64, offset as i64], |row| {
                Ok(Company {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    website: row.get(3)?,
                    location: row.get(4)?,
                    owner_id: row.get::<_, i64>(5)? as usize,
                    created: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(companies)
    }

    fn count_companies(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM company", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl JobStore for SqliteBoardStore {
    fn add_job(&self, job: &Job) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let category_id = match &job.category {
            Some(name) => Some(get_or_create_named(&conn, "category", name)?),
            None => None,
        };
        let location_id = match &job.location {
            Some(name) => Some(get_or_create_named(&conn, "location", name)?),
            None => None,
        };
        conn.execute(
            "INSERT INTO job (id, company_id, author_id, title, description, employment_type,
             salary_min, salary_max, category_id, location_id, status, deadline, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                job.id,
                job.company_id,
                job.author_id as i64,
                job.title,
                job.description,
                job.employment_type.as_str(),
                job.salary_min.map(|s| s as i64),
                job.salary_max.map(|s| s as i64),
                category_id,
                location_id,
                job.status.as_int(),
                job.deadline,
                job.created,
                job.updated,
            ],
        )?;
        Self::replace_job_skills(&conn, &job.id, &job.skills)?;
        Ok(())
    }

    fn get_job(&self, job_id: &str) -> Result<Option<Job>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!("{} WHERE j.id = ?1", JOB_SELECT),
                params![job_id],
                read_job_row,
            )
            .optional()?;
        match row {
            None => Ok(None),
            Some(row) => {
                let skills = Self::job_skills(&conn, job_id)?;
                Ok(Some(job_from_row(row, skills)?))
            }
        }
    }

    fn update_job(&self, job: &Job) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let category_id = match &job.category {
            Some(name) => Some(get_or_create_named(&conn, "category", name)?),
            None => None,
        };
        let location_id = match &job.location {
            Some(name) => Some(get_or_create_named(&conn, "location", name)?),
            None => None,
        };
        conn.execute(
            "UPDATE job SET title = ?1, description = ?2, employment_type = ?3, salary_min = ?4,
             salary_max = ?5, category_id = ?6, location_id = ?7, deadline = ?8, updated = ?9
             WHERE id = ?10",
            params![
                job.title,
                job.description,
                job.employment_type.as_str(),
                job.salary_min.map(|s| s as i64),
                job.salary_max.map(|s| s as i64),
                category_id,
                location_id,
                job.deadline,
                now_ts(),
                job.id,
            ],
        )?;
        Self::replace_job_skills(&conn, &job.id, &job.skills)?;
        Ok(())
    }

    fn delete_job(&self, job_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM job WHERE id = ?1", params![job_id])?;
        Ok(())
    }

    fn set_job_status(&self, job_id: &str, status: JobStatus) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE job SET status = ?1, updated = ?2 WHERE id = ?3",
            params![status.as_int(), now_ts(), job_id],
        )?;
        Ok(())
    }

    fn list_jobs(&self, filter: &JobFilter) -> Result<(Vec<Job>, usize)> {
        let (where_clause, args) = Self::filter_clauses(filter);
        let conn = self.conn.lock().unwrap();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM job j{}", where_clause),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "{}{} ORDER BY j.created DESC, j.id DESC LIMIT ?{} OFFSET ?{}",
            JOB_SELECT,
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let mut all_args = args;
        all_args.push(Value::Integer(filter.limit as i64));
        all_args.push(Value::Integer(filter.offset as i64));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(all_args.iter()), read_job_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut jobs = Vec::with_capacity(rows.len());
        for row in rows {
            let skills = Self::job_skills(&conn, &row.0)?;
            jobs.push(job_from_row(row, skills)?);
        }
        Ok((jobs, total as usize))
    }

    fn expire_overdue_jobs(&self, now: i64) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let expired = conn.execute(
            "UPDATE job SET status = ?1, updated = ?2
             WHERE status = ?3 AND deadline IS NOT NULL AND deadline < ?2",
            params![JobStatus::Expired.as_int(), now, JobStatus::Active.as_int()],
        )?;
        Ok(expired)
    }

    fn count_jobs(&self, status: Option<JobStatus>) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = match status {
            Some(status) => conn.query_row(
                "SELECT COUNT(*) FROM job WHERE status = ?1",
                params![status.as_int()],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM job", [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    fn get_categories(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT name FROM category ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn get_locations(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT name FROM location ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn get_skills(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT name FROM skill ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

fn read_application_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Application, i32)> {
    Ok((
        Application {
            id: row.get(0)?,
            job_id: row.get(1)?,
            candidate_id: row.get::<_, i64>(2)? as usize,
            cover_letter: row.get(3)?,
            // Placeholder, remapped below once the raw int is known good
            status: ApplicationStatus::Submitted,
            created: row.get(5)?,
            updated: row.get(6)?,
        },
        row.get(4)?,
    ))
}

fn finish_application(pair: (Application, i32)) -> Result<Application> {
    let (mut application, status) = pair;
    application.status = ApplicationStatus::from_int(status)
        .with_context(|| format!("Unknown application status {}", status))?;
    Ok(application)
}

const APPLICATION_SELECT: &str =
    "SELECT id, job_id, candidate_id, cover_letter, status, created, updated FROM application";

impl ApplicationStore for SqliteBoardStore {
    fn add_application(&self, application: &Application) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO application (id, job_id, candidate_id, cover_letter, status, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                application.id,
                application.job_id,
                application.candidate_id as i64,
                application.cover_letter,
                application.status.as_int(),
                application.created,
                application.updated,
            ],
        )?;
        Ok(())
    }

    fn get_application(&self, application_id: &str) -> Result<Option<Application>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!("{} WHERE id = ?1", APPLICATION_SELECT),
                params![application_id],
                read_application_row,
            )
            .optional()?;
        row.map(finish_application).transpose()
    }

    fn get_application_for_candidate(
        &self,
        job_id: &str,
        candidate_id: usize,
    ) -> Result<Option<Application>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!(
                    "{} WHERE job_id = ?1 AND candidate_id = ?2",
                    APPLICATION_SELECT
                ),
                params![job_id, candidate_id as i64],
                read_application_row,
            )
            .optional()?;
        row.map(finish_application).transpose()
    }

    fn get_job_applications(&self, job_id: &str) -> Result<Vec<Application>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE job_id = ?1 ORDER BY created DESC, id DESC",
            APPLICATION_SELECT
        ))?;
        let rows = stmt
            .query_map(params![job_id], read_application_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(finish_application).collect()
    }

    fn get_candidate_applications(&self, candidate_id: usize) -> Result<Vec<Application>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE candidate_id = ?1 ORDER BY created DESC, id DESC",
            APPLICATION_SELECT
        ))?;
        let rows = stmt
            .query_map(params![candidate_id as i64], read_application_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(finish_application).collect()
    }

    fn set_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE application SET status = ?1, updated = ?2 WHERE id = ?3",
            params![status.as_int(), now_ts(), application_id],
        )?;
        Ok(())
    }

    fn count_applications(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM application", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn read_comment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        job_id: row.get(1)?,
        author_id: row.get::<_, i64>(2)? as usize,
        parent_id: row.get(3)?,
        body: row.get(4)?,
        edited: row.get::<_, i32>(5)? != 0,
        created: row.get(6)?,
    })
}

impl CommentStore for SqliteBoardStore {
    fn add_comment(&self, comment: &Comment) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO job_comment (id, job_id, author_id, parent_id, body, edited, created)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                comment.id,
                comment.job_id,
                comment.author_id as i64,
                comment.parent_id,
                comment.body,
                comment.edited as i32,
                comment.created,
            ],
        )?;
        Ok(())
    }

    fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>> {
        let conn = self.conn.lock().unwrap();
        let comment = conn
            .query_row(
                "SELECT id, job_id, author_id, parent_id, body, edited, created
                 FROM job_comment WHERE id = ?1",
                params![comment_id],
                read_comment_row,
            )
            .optional()?;
        Ok(comment)
    }

    fn get_job_comments(&self, job_id: &str) -> Result<Vec<Comment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, job_id, author_id, parent_id, body, edited, created
             FROM job_comment WHERE job_id = ?1 ORDER BY created ASC, id ASC",
        )?;
        let comments = stmt
            .query_map(params![job_id], read_comment_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    fn update_comment_body(&self, comment_id: &str, body: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE job_comment SET body = ?1, edited = 1 WHERE id = ?2",
            params![body, comment_id],
        )?;
        Ok(())
    }

    fn delete_comment(&self, comment_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM job_comment WHERE id = ?1",
            params![comment_id],
        )?;
        Ok(())
    }
}

fn read_review_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        company_id: row.get(1)?,
        author_id: row.get::<_, i64>(2)? as usize,
        rating: row.get::<_, i64>(3)? as u8,
        title: row.get(4)?,
        body: row.get(5)?,
        created: row.get(6)?,
    })
}

impl ReviewStore for SqliteBoardStore {
    fn add_review(&self, review: &Review) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO company_review (id, company_id, author_id, rating, title, body, created)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                review.id,
                review.company_id,
                review.author_id as i64,
                review.rating as i64,
                review.title,
                review.body,
                review.created,
            ],
        )?;
        Ok(())
    }

    fn get_review(&self, review_id: &str) -> Result<Option<Review>> {
        let conn = self.conn.lock().unwrap();
        let review = conn
            .query_row(
                "SELECT id, company_id, author_id, rating, title, body, created
                 FROM company_review WHERE id = ?1",
                params![review_id],
                read_review_row,
            )
            .optional()?;
        Ok(review)
    }

    fn get_review_by_author(
        &self,
        company_id: &str,
        author_id: usize,
    ) -> Result<Option<Review>> {
        let conn = self.conn.lock().unwrap();
        let review = conn
            .query_row(
                "SELECT id, company_id, author_id, rating, title, body, created
                 FROM company_review WHERE company_id = ?1 AND author_id = ?2",
                params![company_id, author_id as i64],
                read_review_row,
            )
            .optional()?;
        Ok(review)
    }

    fn get_company_reviews(&self, company_id: &str) -> Result<Vec<Review>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, company_id, author_id, rating, title, body, created
             FROM company_review WHERE company_id = ?1 ORDER BY created DESC, id DESC",
        )?;
        let reviews = stmt
            .query_map(params![company_id], read_review_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reviews)
    }

    fn delete_review(&self, review_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM company_review WHERE id = ?1",
            params![review_id],
        )?;
        Ok(())
    }

    fn get_company_review_aggregate(&self, company_id: &str) -> Result<ReviewAggregate> {
        let conn = self.conn.lock().unwrap();
        let (average_rating, review_count): (Option<f64>, i64) = conn.query_row(
            "SELECT AVG(rating), COUNT(*) FROM company_review WHERE company_id = ?1",
            params![company_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(ReviewAggregate {
            average_rating,
            review_count: review_count as usize,
        })
    }
}
