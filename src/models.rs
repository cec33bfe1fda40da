use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

fn to_utc(dt: Option<NaiveDateTime>) -> DateTime<Utc> {
    dt.map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .unwrap_or_else(Utc::now)
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub city: String,
    pub website: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCourse {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbCourse> for Course {
    fn from(course: DbCourse) -> Self {
        Self {
            id: course.id.unwrap_or_default(),
            name: course.name.unwrap_or_default(),
            country: course.country.unwrap_or_default(),
            city: course.city.unwrap_or_default(),
            website: course.website,
            created_by: course.created_by,
            created_at: to_utc(course.created_at),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct TeeBox {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub course_rating: f64,
    pub slope_rating: i64,
    pub yardage: Option<i64>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTeeBox {
    pub id: Option<i64>,
    pub course_id: Option<i64>,
    pub name: Option<String>,
    pub course_rating: Option<f64>,
    pub slope_rating: Option<i64>,
    pub yardage: Option<i64>,
}

impl From<DbTeeBox> for TeeBox {
    fn from(tee: DbTeeBox) -> Self {
        Self {
            id: tee.id.unwrap_or_default(),
            course_id: tee.course_id.unwrap_or_default(),
            name: tee.name.unwrap_or_default(),
            course_rating: tee.course_rating.unwrap_or_default(),
            slope_rating: tee.slope_rating.unwrap_or_default(),
            yardage: tee.yardage,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CourseHole {
    pub id: i64,
    pub course_id: i64,
    pub hole_number: i64,
    pub par: i64,
    pub stroke_index: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCourseHole {
    pub id: Option<i64>,
    pub course_id: Option<i64>,
    pub hole_number: Option<i64>,
    pub par: Option<i64>,
    pub stroke_index: Option<i64>,
}

impl From<DbCourseHole> for CourseHole {
    fn from(hole: DbCourseHole) -> Self {
        Self {
            id: hole.id.unwrap_or_default(),
            course_id: hole.course_id.unwrap_or_default(),
            hole_number: hole.hole_number.unwrap_or_default(),
            par: hole.par.unwrap_or_default(),
            stroke_index: hole.stroke_index.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CourseAttachment {
    pub id: i64,
    pub course_id: i64,
    pub file_name: String,
    pub stored_name: String,
    pub content_type: Option<String>,
    pub uploaded_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCourseAttachment {
    pub id: Option<i64>,
    pub course_id: Option<i64>,
    pub file_name: Option<String>,
    pub stored_name: Option<String>,
    pub content_type: Option<String>,
    pub uploaded_by: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbCourseAttachment> for CourseAttachment {
    fn from(attachment: DbCourseAttachment) -> Self {
        Self {
            id: attachment.id.unwrap_or_default(),
            course_id: attachment.course_id.unwrap_or_default(),
            file_name: attachment.file_name.unwrap_or_default(),
            stored_name: attachment.stored_name.unwrap_or_default(),
            content_type: attachment.content_type,
            uploaded_by: attachment.uploaded_by,
            created_at: to_utc(attachment.created_at),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct PlayerCard {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub tee_box_id: i64,
    pub played_on: NaiveDate,
    pub gross: i64,
    pub net: i64,
    pub differential: f64,
    pub holes: [i64; 18],
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbPlayerCard {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub course_id: Option<i64>,
    pub tee_box_id: Option<i64>,
    pub played_on: Option<NaiveDate>,
    pub gross: Option<i64>,
    pub net: Option<i64>,
    pub differential: Option<f64>,
    pub h01: Option<i64>,
    pub h02: Option<i64>,
    pub h03: Option<i64>,
    pub h04: Option<i64>,
    pub h05: Option<i64>,
    pub h06: Option<i64>,
    pub h07: Option<i64>,
    pub h08: Option<i64>,
    pub h09: Option<i64>,
    pub h10: Option<i64>,
    pub h11: Option<i64>,
    pub h12: Option<i64>,
    pub h13: Option<i64>,
    pub h14: Option<i64>,
    pub h15: Option<i64>,
    pub h16: Option<i64>,
    pub h17: Option<i64>,
    pub h18: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbPlayerCard> for PlayerCard {
    fn from(card: DbPlayerCard) -> Self {
        let holes = [
            card.h01, card.h02, card.h03, card.h04, card.h05, card.h06, card.h07, card.h08,
            card.h09, card.h10, card.h11, card.h12, card.h13, card.h14, card.h15, card.h16,
            card.h17, card.h18,
        ]
        .map(|h| h.unwrap_or_default());

        Self {
            id: card.id.unwrap_or_default(),
            user_id: card.user_id.unwrap_or_default(),
            course_id: card.course_id.unwrap_or_default(),
            tee_box_id: card.tee_box_id.unwrap_or_default(),
            played_on: card.played_on.unwrap_or_default(),
            gross: card.gross.unwrap_or_default(),
            net: card.net.unwrap_or_default(),
            differential: card.differential.unwrap_or_default(),
            holes,
            created_at: to_utc(card.created_at),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Quote {
    pub id: i64,
    pub text: String,
    pub author: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbQuote {
    pub id: Option<i64>,
    pub text: Option<String>,
    pub author: Option<String>,
}

impl From<DbQuote> for Quote {
    fn from(quote: DbQuote) -> Self {
        Self {
            id: quote.id.unwrap_or_default(),
            text: quote.text.unwrap_or_default(),
            author: quote.author,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct NewsArticle {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub source_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub created_by: Option<i64>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbNewsArticle {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub source_url: Option<String>,
    pub published_at: Option<NaiveDateTime>,
    pub created_by: Option<i64>,
}

impl From<DbNewsArticle> for NewsArticle {
    fn from(article: DbNewsArticle) -> Self {
        Self {
            id: article.id.unwrap_or_default(),
            title: article.title.unwrap_or_default(),
            body: article.body.unwrap_or_default(),
            source_url: article.source_url,
            published_at: to_utc(article.published_at),
            created_by: article.created_by,
        }
    }
}
