//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use serde_json::{Value, json};
use walkpath::models::Coordinates;

pub const CITY_HALL: Coordinates = Coordinates {
    latitude: 37.5665,
    longitude: 126.9780,
};

/// Point `km` due north of Seoul City Hall
pub fn north_of_city_hall(km: f64) -> Coordinates {
    Coordinates::new(
        CITY_HALL.latitude + (km / 6371.0).to_degrees(),
        CITY_HALL.longitude,
    )
}

/// Raw path row as the backend table returns it
pub fn path_row(code: &str, level: &str, km_away: f64) -> Value {
    let position = north_of_city_hall(km_away);
    json!({
        "CoursCode": code,
        "WlkCoursFlagNm": "서울둘레길",
        "WlkCoursNm": format!("{code} 코스"),
        "CoursDc": "공원과 하천을 따라 걷는 길",
        "SignguNm": "서울특별시 중구",
        "CoursLevelNm": level,
        "CoursLtCn": "3.5km",
        "CoursTimeCn": "1시간",
        "CoursRoute": "시청-덕수궁-정동길",
        "Option": "화장실, 주차장",
        "Latitude": position.latitude,
        "Longitude": position.longitude,
    })
}

pub fn market_row(name: &str, km_away: f64) -> Value {
    let position = north_of_city_hall(km_away);
    json!({
        "시장명": name,
        "시장유형": "상설장",
        "소재지도로명주소": "서울특별시 중구",
        "점포수": 120,
        "위도": position.latitude,
        "경도": position.longitude,
    })
}

/// The City Hall scenario: 1.2, 6.0 and 3.4 km away
pub fn city_hall_paths() -> Vec<Value> {
    vec![
        path_row("A", "쉬움", 1.2),
        path_row("B", "쉬움", 6.0),
        path_row("C", "어려움", 3.4),
    ]
}

/// Serve `app` on an ephemeral local port
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
