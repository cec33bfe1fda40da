#[cfg(test)]
pub mod test_utils {
    use crate::api::LoginResponse;
    use crate::auth::Role;
    use crate::config::AppConfig;
    use crate::db::{
        NewCourseHole, NewTeeBox, create_course, create_player_card, create_user, set_user_flags,
    };
    use crate::error::AppError;
    use crate::handicap;
    use crate::init_rocket;
    use crate::migrations::sync_schema;
    use crate::schema::CURRENT_SCHEMA;
    use chrono::NaiveDate;
    use rocket::http::{ContentType, Header};
    use rocket::local::asynchronous::Client;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};
    use std::collections::HashMap;
    use std::sync::Once;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
        courses: Vec<TestCourse>,
        cards: Vec<TestCard>,
    }

    pub struct TestUser {
        pub username: String,
        pub display_name: Option<String>,
        pub role: Role,
        pub password: String,
    }

    pub struct TestCourse {
        pub name: String,
        pub country: String,
        pub city: String,
        pub tee_boxes: Vec<(String, f64, i64)>,
    }

    pub struct TestCard {
        pub player_username: String,
        pub course_name: String,
        pub tee_name: String,
        pub played_on: NaiveDate,
        pub holes: [i64; 18],
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn player(mut self, username: &str, display_name: Option<&str>) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                display_name: display_name.map(String::from),
                role: Role::Player,
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn editor(mut self, username: &str, display_name: Option<&str>) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                display_name: display_name.map(String::from),
                role: Role::Editor,
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn admin(mut self, username: &str, display_name: Option<&str>) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                display_name: display_name.map(String::from),
                role: Role::Admin,
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        /// A course with the given tee boxes (name, course rating, slope)
        /// and a standard 18-hole par-72 layout.
        pub fn course(mut self, name: &str, country: &str, city: &str, tees: &[(&str, f64, i64)]) -> Self {
            self.courses.push(TestCourse {
                name: name.to_string(),
                country: country.to_string(),
                city: city.to_string(),
                tee_boxes: tees
                    .iter()
                    .map(|(n, cr, sr)| (n.to_string(), *cr, *sr))
                    .collect(),
            });
            self
        }

        pub fn card(
            mut self,
            player_username: &str,
            course_name: &str,
            tee_name: &str,
            played_on: NaiveDate,
            holes: [i64; 18],
        ) -> Self {
            self.cards.push(TestCard {
                player_username: player_username.to_string(),
                course_name: course_name.to_string(),
                tee_name: tee_name.to_string(),
                played_on,
                holes,
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder()
                    .parse_filters("debug")
                    .is_test(true)
                    .try_init();
            });

            // A single connection keeps every query on the same in-memory
            // database.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await?;

            sync_schema(pool.clone(), CURRENT_SCHEMA, false).await?;

            let mut user_id_map: HashMap<String, i64> = HashMap::new();
            let mut course_id_map: HashMap<String, i64> = HashMap::new();
            let mut tee_id_map: HashMap<String, i64> = HashMap::new();

            for user in &self.users {
                let email = format!("{}@example.com", user.username);
                let user_id = create_user(
                    &pool,
                    &user.username,
                    &email,
                    &user.password,
                    user.display_name.as_deref(),
                )
                .await?;

                match user.role {
                    Role::Player => {}
                    Role::Editor => {
                        set_user_flags(&pool, user_id, Some(false), Some(true)).await?;
                    }
                    Role::Admin => {
                        set_user_flags(&pool, user_id, Some(true), Some(false)).await?;
                    }
                }

                user_id_map.insert(user.username.clone(), user_id);
            }

            let creator_id = user_id_map.values().next().copied().unwrap_or(1);

            for course in &self.courses {
                let tee_boxes: Vec<NewTeeBox> = course
                    .tee_boxes
                    .iter()
                    .map(|(name, course_rating, slope_rating)| NewTeeBox {
                        name: name.clone(),
                        course_rating: *course_rating,
                        slope_rating: *slope_rating,
                        yardage: None,
                    })
                    .collect();

                let holes = standard_holes();

                let course_id = create_course(
                    &pool,
                    creator_id,
                    &course.name,
                    &course.country,
                    &course.city,
                    None,
                    &tee_boxes,
                    &holes,
                )
                .await?;

                course_id_map.insert(course.name.clone(), course_id);

                let created_tees = crate::db::get_course_tee_boxes(&pool, course_id).await?;
                for tee in created_tees {
                    tee_id_map.insert(format!("{}/{}", course.name, tee.name), tee.id);
                }
            }

            for card in &self.cards {
                let user_id = user_id_map[&card.player_username];
                let course_id = course_id_map[&card.course_name];
                let tee_id = tee_id_map[&format!("{}/{}", card.course_name, card.tee_name)];

                let tee = crate::db::get_tee_box(&pool, tee_id).await?;
                let gross: i64 = card.holes.iter().sum();
                let differential =
                    handicap::score_differential(gross, tee.course_rating, tee.slope_rating);
                let prior = crate::db::get_recent_differentials(
                    &pool,
                    user_id,
                    handicap::WINDOW as i64,
                )
                .await?;
                let net = handicap::net_score(gross, handicap::handicap_index(&prior));

                create_player_card(
                    &pool,
                    user_id,
                    course_id,
                    tee_id,
                    card.played_on,
                    &card.holes,
                    gross,
                    net,
                    differential,
                )
                .await?;
            }

            Ok(TestDb {
                pool,
                user_id_map,
                course_id_map,
                tee_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub user_id_map: HashMap<String, i64>,
        pub course_id_map: HashMap<String, i64>,
        pub tee_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn user_id(&self, username: &str) -> Option<i64> {
            self.user_id_map.get(username).copied()
        }

        pub fn course_id(&self, name: &str) -> Option<i64> {
            self.course_id_map.get(name).copied()
        }

        pub fn tee_id(&self, course_name: &str, tee_name: &str) -> Option<i64> {
            self.tee_id_map
                .get(&format!("{}/{}", course_name, tee_name))
                .copied()
        }
    }

    /// Eighteen par-4 holes, stroke indices 1 through 18.
    pub fn standard_holes() -> Vec<NewCourseHole> {
        (1..=18)
            .map(|n| NewCourseHole {
                hole_number: n,
                par: 4,
                stroke_index: n,
            })
            .collect()
    }

    /// Eighteen hole scores summing to the given gross, distributed as evenly
    /// as the arithmetic allows.
    pub fn holes_totalling(gross: i64) -> [i64; 18] {
        let base = gross / 18;
        let extra = (gross % 18) as usize;
        let mut holes = [base; 18];
        for hole in holes.iter_mut().take(extra) {
            *hole += 1;
        }
        holes
    }

    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .player("player_user", Some("Player User"))
            .player("other_player", Some("Other Player"))
            .editor("editor_user", Some("Editor User"))
            .admin("admin_user", Some("Admin User"))
            .course(
                "Pebble Creek",
                "Australia",
                "Melbourne",
                &[("White", 72.1, 128), ("Blue", 74.0, 135)],
            )
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let rocket = init_rocket(test_db.pool.clone(), AppConfig::for_tests()).await;

        let client = Client::tracked(rocket)
            .await
            .expect("Failed to build test client");

        (client, test_db)
    }

    /// Logs in through the API and returns the bearer token.
    pub async fn login_test_user(client: &Client, username: &str, password: &str) -> String {
        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": username,
                    "password": password
                })
                .to_string(),
            )
            .dispatch()
            .await;

        let body = response.into_string().await.expect("Empty login response");
        let login: LoginResponse = serde_json::from_str(&body).expect("Malformed login response");

        login.token
    }

    pub fn bearer(token: &str) -> Header<'static> {
        Header::new("Authorization", format!("Bearer {}", token))
    }
}
