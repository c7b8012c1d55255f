//! Canned restaurant suggestions by region

/// Region keyword -> restaurant names. First keyword found in the region
/// name wins, so more specific districts come before their city.
const REGIONAL_FOOD: &[(&str, &[&str])] = &[
    ("종로", &["토속촌 삼계탕", "광장시장 빈대떡", "익선동 한옥 칼국수"]),
    ("중구", &["명동교자", "남대문 갈치조림 골목", "을지로 노가리 골목"]),
    ("마포", &["망원시장 고로케", "연남동 중식당", "합정 순댓국"]),
    ("용산", &["이태원 수제버거", "해방촌 브런치 카페", "삼각지 대구탕"]),
    ("성동", &["성수동 베이커리", "왕십리 곱창 골목", "뚝섬 국수집"]),
    ("강남", &["신사동 가로수길 파스타", "논현동 영동시장 족발", "압구정 냉면"]),
    ("송파", &["석촌호수 카페거리", "방이동 먹자골목", "가락시장 회센터"]),
    ("영등포", &["여의도 콩국수", "영등포 시장 순대국", "문래동 철공소 카페"]),
    ("은평", &["불광천 떡볶이", "연신내 감자탕", "진관사 사찰음식"]),
    ("노원", &["공릉동 국수거리", "중계동 은행사거리 분식", "상계동 닭갈비"]),
    ("관악", &["신림동 순대타운", "서울대입구 샤로수길", "봉천동 해장국"]),
    ("부산", &["자갈치 시장 회센터", "돼지국밥 골목", "밀면 전문점"]),
    ("인천", &["차이나타운 짜장면", "신포시장 닭강정", "연안부두 밴댕이 회무침"]),
    ("수원", &["수원 왕갈비", "통닭거리", "지동시장 순대"]),
    ("춘천", &["춘천 닭갈비 골목", "막국수 체험 박물관 식당", "소양강 카페"]),
    ("강릉", &["초당 순두부 마을", "안목해변 커피거리", "중앙시장 닭강정"]),
    ("전주", &["전주 비빔밥", "남부시장 콩나물국밥", "한옥마을 길거리 음식"]),
    ("경주", &["황리단길 카페", "경주 쌈밥 거리", "황남빵 본점"]),
    ("제주", &["흑돼지 거리", "고기국수 골목", "동문시장 야시장"]),
    ("서울", &["동네 칼국수집", "전통시장 분식", "한식 백반집"]),
];

const DEFAULT_FOOD: &[&str] = &["근처 한식 백반집", "동네 분식집", "전통 찻집"];

/// Restaurant names for the path's region, with a generic fallback
#[must_use]
pub fn nearby_food(region: Option<&str>) -> Vec<String> {
    let names = region
        .and_then(|region| {
            REGIONAL_FOOD
                .iter()
                .find(|(keyword, _)| region.contains(keyword))
                .map(|(_, names)| *names)
        })
        .unwrap_or(DEFAULT_FOOD);

    names.iter().map(|name| (*name).to_string()).collect()
}
