use chrono::NaiveDate;
use rand::Rng;
use sqlx::{Pool, Row, Sqlite};
use tracing::{info, instrument};

use crate::auth::{DbUser, User};
use crate::error::AppError;
use crate::models::{
    Course, CourseAttachment, CourseHole, DbCourse, DbCourseAttachment, DbCourseHole,
    DbNewsArticle, DbPlayerCard, DbQuote, DbTeeBox, NewsArticle, PlayerCard, Quote, TeeBox,
};

const USER_COLUMNS: &str =
    "id, username, email, display_name, is_admin, is_editor, gender, birthday";

pub struct NewTeeBox {
    pub name: String,
    pub course_rating: f64,
    pub slope_rating: i64,
    pub yardage: Option<i64>,
}

pub struct NewCourseHole {
    pub hole_number: i64,
    pub par: i64,
    pub stroke_index: i64,
}

// ---------------------------------------------------------------------------
// Users

#[instrument(skip_all, fields(username, email))]
pub async fn create_user(
    pool: &Pool<Sqlite>,
    username: &str,
    email: &str,
    password: &str,
    display_name: Option<&str>,
) -> Result<i64, AppError> {
    info!("Creating new user");

    let existing = sqlx::query("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let hashed_password = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    let res = sqlx::query(
        "INSERT INTO users (username, email, password, display_name) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(email)
    .bind(hashed_password)
    .bind(display_name.unwrap_or(username))
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn get_user(pool: &Pool<Sqlite>, id: i64) -> Result<User, AppError> {
    let row = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(user) => Ok(User::from(user)),
        _ => Err(AppError::NotFound(format!(
            "User with id {} not found in database",
            id
        ))),
    }
}

#[instrument(skip_all, fields(username))]
pub async fn authenticate_user(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    info!("Authenticating user");

    let row = sqlx::query(&format!(
        "SELECT {}, password FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let hash: String = row.get("password");
    let valid = bcrypt::verify(password, &hash).unwrap_or(false);
    if !valid {
        return Ok(None);
    }

    let user = DbUser {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        is_admin: row.get("is_admin"),
        is_editor: row.get("is_editor"),
        gender: row.get("gender"),
        birthday: row.get("birthday"),
    };

    Ok(Some(User::from(user)))
}

#[instrument]
pub async fn update_user_display_name(
    pool: &Pool<Sqlite>,
    user_id: i64,
    display_name: &str,
) -> Result<(), AppError> {
    info!("Updating user display name");
    sqlx::query("UPDATE users SET display_name = ? WHERE id = ?")
        .bind(display_name)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument]
pub async fn update_user_email(
    pool: &Pool<Sqlite>,
    user_id: i64,
    email: &str,
) -> Result<(), AppError> {
    info!("Updating user email");
    let existing = sqlx::query("SELECT id FROM users WHERE email = ? AND id != ?")
        .bind(email)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    sqlx::query("UPDATE users SET email = ? WHERE id = ?")
        .bind(email)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument]
pub async fn update_username(
    pool: &Pool<Sqlite>,
    user_id: i64,
    new_username: &str,
) -> Result<(), AppError> {
    info!("Updating user username");
    let existing = sqlx::query("SELECT id FROM users WHERE username = ? AND id != ?")
        .bind(new_username)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    sqlx::query("UPDATE users SET username = ? WHERE id = ?")
        .bind(new_username)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip_all, fields(user_id))]
pub async fn update_user_password(
    pool: &Pool<Sqlite>,
    user_id: i64,
    new_password: &str,
) -> Result<(), AppError> {
    info!("Updating user password");
    let hashed_password = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)?;

    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(hashed_password)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument]
pub async fn update_user_details(
    pool: &Pool<Sqlite>,
    user_id: i64,
    gender: Option<&str>,
    birthday: Option<NaiveDate>,
) -> Result<(), AppError> {
    info!("Updating user details");
    if let Some(gender) = gender {
        sqlx::query("UPDATE users SET gender = ? WHERE id = ?")
            .bind(gender)
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    if let Some(birthday) = birthday {
        sqlx::query("UPDATE users SET birthday = ? WHERE id = ?")
            .bind(birthday)
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    Ok(())
}

#[instrument]
pub async fn set_user_flags(
    pool: &Pool<Sqlite>,
    user_id: i64,
    is_admin: Option<bool>,
    is_editor: Option<bool>,
) -> Result<(), AppError> {
    info!("Updating user role flags");
    if let Some(is_admin) = is_admin {
        sqlx::query("UPDATE users SET is_admin = ? WHERE id = ?")
            .bind(is_admin)
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    if let Some(is_editor) = is_editor {
        sqlx::query("UPDATE users SET is_editor = ? WHERE id = ?")
            .bind(is_editor)
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    Ok(())
}

#[instrument]
pub async fn delete_user(pool: &Pool<Sqlite>, user_id: i64) -> Result<(), AppError> {
    info!("Deleting user and owned records");

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM player_cards WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE courses SET created_by = NULL WHERE created_by = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE course_attachments SET uploaded_by = NULL WHERE uploaded_by = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE news_articles SET created_by = NULL WHERE created_by = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

#[instrument]
pub async fn get_all_users(pool: &Pool<Sqlite>) -> Result<Vec<User>, AppError> {
    let rows = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {} FROM users ORDER BY username",
        USER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(User::from).collect())
}

// ---------------------------------------------------------------------------
// Courses

#[instrument]
pub async fn list_courses(
    pool: &Pool<Sqlite>,
    country: Option<&str>,
    search: Option<&str>,
) -> Result<Vec<Course>, AppError> {
    info!("Listing courses");

    let mut sql = String::from("SELECT * FROM courses WHERE 1 = 1");
    if country.is_some() {
        sql.push_str(" AND country = ?");
    }
    if search.is_some() {
        sql.push_str(" AND name LIKE ?");
    }
    sql.push_str(" ORDER BY name");

    let mut query = sqlx::query_as::<_, DbCourse>(&sql);
    if let Some(country) = country {
        query = query.bind(country.to_string());
    }
    if let Some(search) = search {
        query = query.bind(format!("%{}%", search));
    }

    let rows = query.fetch_all(pool).await?;

    Ok(rows.into_iter().map(Course::from).collect())
}

#[instrument]
pub async fn get_course(pool: &Pool<Sqlite>, id: i64) -> Result<Course, AppError> {
    let row = sqlx::query_as::<_, DbCourse>("SELECT * FROM courses WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(course) => Ok(Course::from(course)),
        _ => Err(AppError::NotFound(format!(
            "Course with id {} not found in database",
            id
        ))),
    }
}

#[instrument]
pub async fn get_course_tee_boxes(
    pool: &Pool<Sqlite>,
    course_id: i64,
) -> Result<Vec<TeeBox>, AppError> {
    let rows =
        sqlx::query_as::<_, DbTeeBox>("SELECT * FROM tee_boxes WHERE course_id = ? ORDER BY id")
            .bind(course_id)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(TeeBox::from).collect())
}

#[instrument]
pub async fn get_course_holes(
    pool: &Pool<Sqlite>,
    course_id: i64,
) -> Result<Vec<CourseHole>, AppError> {
    let rows = sqlx::query_as::<_, DbCourseHole>(
        "SELECT * FROM course_holes WHERE course_id = ? ORDER BY hole_number",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CourseHole::from).collect())
}

#[instrument]
pub async fn get_course_attachments(
    pool: &Pool<Sqlite>,
    course_id: i64,
) -> Result<Vec<CourseAttachment>, AppError> {
    let rows = sqlx::query_as::<_, DbCourseAttachment>(
        "SELECT * FROM course_attachments WHERE course_id = ? ORDER BY id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CourseAttachment::from).collect())
}

/// Creates the course together with its tee boxes and holes in one
/// transaction; any failing insert rolls back the whole course.
#[instrument(skip_all, fields(name))]
pub async fn create_course(
    pool: &Pool<Sqlite>,
    created_by: i64,
    name: &str,
    country: &str,
    city: &str,
    website: Option<&str>,
    tee_boxes: &[NewTeeBox],
    holes: &[NewCourseHole],
) -> Result<i64, AppError> {
    info!("Creating course");

    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "INSERT INTO courses (name, country, city, website, created_by) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(name)
    .bind(country)
    .bind(city)
    .bind(website)
    .bind(created_by)
    .execute(&mut *tx)
    .await?;

    let course_id = res.last_insert_rowid();

    for tee in tee_boxes {
        sqlx::query(
            "INSERT INTO tee_boxes (course_id, name, course_rating, slope_rating, yardage)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(course_id)
        .bind(&tee.name)
        .bind(tee.course_rating)
        .bind(tee.slope_rating)
        .bind(tee.yardage)
        .execute(&mut *tx)
        .await?;
    }

    for hole in holes {
        sqlx::query(
            "INSERT INTO course_holes (course_id, hole_number, par, stroke_index)
             VALUES (?, ?, ?, ?)",
        )
        .bind(course_id)
        .bind(hole.hole_number)
        .bind(hole.par)
        .bind(hole.stroke_index)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(course_id)
}

#[instrument]
pub async fn get_tee_box(pool: &Pool<Sqlite>, id: i64) -> Result<TeeBox, AppError> {
    let row = sqlx::query_as::<_, DbTeeBox>("SELECT * FROM tee_boxes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(tee) => Ok(TeeBox::from(tee)),
        _ => Err(AppError::NotFound(format!(
            "Tee box with id {} not found in database",
            id
        ))),
    }
}

#[instrument]
pub async fn count_course_attachments(
    pool: &Pool<Sqlite>,
    course_id: i64,
) -> Result<i64, AppError> {
    let row = sqlx::query("SELECT COUNT(*) FROM course_attachments WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>(0))
}

#[instrument(skip_all, fields(course_id))]
pub async fn add_course_attachment(
    pool: &Pool<Sqlite>,
    course_id: i64,
    file_name: &str,
    stored_name: &str,
    content_type: Option<&str>,
    uploaded_by: i64,
) -> Result<i64, AppError> {
    info!("Adding course attachment");

    let res = sqlx::query(
        "INSERT INTO course_attachments (course_id, file_name, stored_name, content_type, uploaded_by)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(course_id)
    .bind(file_name)
    .bind(stored_name)
    .bind(content_type)
    .bind(uploaded_by)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

// ---------------------------------------------------------------------------
// Player cards

#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(user_id, course_id))]
pub async fn create_player_card(
    pool: &Pool<Sqlite>,
    user_id: i64,
    course_id: i64,
    tee_box_id: i64,
    played_on: NaiveDate,
    holes: &[i64; 18],
    gross: i64,
    net: i64,
    differential: f64,
) -> Result<i64, AppError> {
    info!("Creating player card");

    let mut query = sqlx::query(
        "INSERT INTO player_cards
         (user_id, course_id, tee_box_id, played_on, gross, net, differential,
          h01, h02, h03, h04, h05, h06, h07, h08, h09,
          h10, h11, h12, h13, h14, h15, h16, h17, h18)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(tee_box_id)
    .bind(played_on)
    .bind(gross)
    .bind(net)
    .bind(differential);

    for hole in holes {
        query = query.bind(*hole);
    }

    let res = query.execute(pool).await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn get_cards_for_user(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Vec<PlayerCard>, AppError> {
    let rows = sqlx::query_as::<_, DbPlayerCard>(
        "SELECT * FROM player_cards WHERE user_id = ? ORDER BY played_on DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PlayerCard::from).collect())
}

/// Differentials ordered newest round first, capped at `limit`.
#[instrument]
pub async fn get_recent_differentials(
    pool: &Pool<Sqlite>,
    user_id: i64,
    limit: i64,
) -> Result<Vec<f64>, AppError> {
    let rows = sqlx::query(
        "SELECT differential FROM player_cards
         WHERE user_id = ? ORDER BY played_on DESC, id DESC LIMIT ?",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get::<f64, _>(0)).collect())
}

// ---------------------------------------------------------------------------
// Quotes and news

#[instrument]
pub async fn random_quote(pool: &Pool<Sqlite>) -> Result<Option<Quote>, AppError> {
    let row = sqlx::query("SELECT COUNT(*) FROM quotes")
        .fetch_one(pool)
        .await?;
    let count: i64 = row.get(0);

    if count == 0 {
        return Ok(None);
    }

    let offset = rand::rng().random_range(0..count);

    let row = sqlx::query_as::<_, DbQuote>("SELECT * FROM quotes LIMIT 1 OFFSET ?")
        .bind(offset)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Quote::from))
}

#[instrument(skip_all)]
pub async fn create_quote(
    pool: &Pool<Sqlite>,
    text: &str,
    author: Option<&str>,
) -> Result<i64, AppError> {
    info!("Creating quote");

    let res = sqlx::query("INSERT INTO quotes (text, author) VALUES (?, ?)")
        .bind(text)
        .bind(author)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn latest_news(pool: &Pool<Sqlite>, limit: i64) -> Result<Vec<NewsArticle>, AppError> {
    let rows = sqlx::query_as::<_, DbNewsArticle>(
        "SELECT * FROM news_articles ORDER BY published_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(NewsArticle::from).collect())
}

#[instrument(skip_all, fields(title))]
pub async fn create_news(
    pool: &Pool<Sqlite>,
    title: &str,
    body: &str,
    source_url: Option<&str>,
    created_by: i64,
) -> Result<i64, AppError> {
    info!("Creating news article");

    let res = sqlx::query(
        "INSERT INTO news_articles (title, body, source_url, created_by) VALUES (?, ?, ?, ?)",
    )
    .bind(title)
    .bind(body)
    .bind(source_url)
    .bind(created_by)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

// ---------------------------------------------------------------------------

#[instrument]
pub async fn ping(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
