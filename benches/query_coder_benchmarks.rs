use criterion::{Criterion, black_box, criterion_group, criterion_main};
use query_coder::{Coder, DecodeOptions, DecodeType, FieldHandler, Schema};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFilter {
    game_id: Option<String>,
    game_mode: Option<String>,
    tags: Option<Vec<String>>,
    wow: Option<WowFilter>,
    lost_ark: Option<LostArkFilter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WowFilter {
    region: Option<u32>,
    dungeon: Option<String>,
    min_rio_rating: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LostArkFilter {
    region: Option<String>,
}

fn coder() -> Coder<SearchFilter> {
    Coder::new(
        Schema::new()
            .field(
                "gameId",
                FieldHandler::new("game").aliases([("WorldOfWarcraft", "wow"), ("LostArk", "la")]),
            )
            .field(
                "gameMode",
                FieldHandler::new("mode").aliases([("WowMythicPlus", "mplus"), ("WowRaid", "raid")]),
            )
            .field("tags", FieldHandler::new("tags").decode_type(DecodeType::Array))
            .nested(
                "wow",
                Schema::new()
                    .field(
                        "region",
                        FieldHandler::new("region")
                            .decode_type(DecodeType::Number)
                            .decode_condition(json!({"gameId": "WorldOfWarcraft"})),
                    )
                    .field("dungeon", FieldHandler::new("dungeon"))
                    .field(
                        "minRioRating",
                        FieldHandler::new("rio").decode_type(DecodeType::Number),
                    ),
            )
            .nested(
                "lostArk",
                Schema::new().field(
                    "region",
                    FieldHandler::new("region").decode_condition(json!({"gameId": "LostArk"})),
                ),
            ),
    )
    .unwrap()
}

fn wow_filter() -> SearchFilter {
    SearchFilter {
        game_id: Some("WorldOfWarcraft".to_string()),
        game_mode: Some("WowMythicPlus".to_string()),
        tags: Some(vec!["voice".to_string(), "english".to_string(), "chill".to_string()]),
        wow: Some(WowFilter {
            region: Some(1),
            dungeon: Some("Mists of Tirna Scithe".to_string()),
            min_rio_rating: Some(2500),
        }),
        lost_ark: None,
    }
}

fn build_coder(c: &mut Criterion) {
    c.bench_function("build_coder", |b| b.iter(|| black_box(coder())));
}

fn encode_filter(c: &mut Criterion) {
    let coder = coder();
    let data = wow_filter();

    c.bench_function("encode_filter", |b| {
        b.iter(|| coder.encode(black_box(&data)).unwrap())
    });
}

fn decode_filter(c: &mut Criterion) {
    let coder = coder();
    let query = coder.encode(&wow_filter()).unwrap();

    c.bench_function("decode_filter", |b| {
        b.iter(|| {
            coder
                .decode(black_box(query.as_str()), DecodeOptions::default())
                .unwrap()
        })
    });
}

fn decode_shared_key(c: &mut Criterion) {
    let coder = coder();

    c.bench_function("decode_shared_key", |b| {
        b.iter(|| {
            coder
                .decode(black_box("game=la&region=US"), DecodeOptions::default())
                .unwrap()
        })
    });
}

criterion_group!(construction, build_coder);

criterion_group!(encode, encode_filter);

criterion_group!(decode, decode_filter, decode_shared_key);

criterion_main!(construction, encode, decode);
