use query_coder::{Coder, DecodeOptions, DecodeType, FieldHandler, Schema};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Language {
    En,
    Ru,
    De,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum GameId {
    WorldOfWarcraft,
    WildRift,
    LostArk,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Region {
    Europe,
    US,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchGroupsFilter {
    game_id: Option<GameId>,
    language: Option<Language>,
    lost_ark: Option<RegionFilter>,
    wow: Option<RegionFilter>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct RegionFilter {
    region: Option<Region>,
}

fn main() {
    let coder = Coder::<SearchGroupsFilter>::new(
        Schema::new()
            .field("language", FieldHandler::new("lang").encodable(false))
            .field(
                "gameId",
                FieldHandler::new("game").aliases([
                    ("WorldOfWarcraft", "wow"),
                    ("WildRift", "wr"),
                    ("LostArk", "la"),
                ]),
            )
            .nested(
                "wow",
                Schema::new().field(
                    "region",
                    FieldHandler::new("region")
                        .decode_type(DecodeType::String)
                        .decode_condition(json!({"gameId": "WorldOfWarcraft"})),
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
    .unwrap();

    let filters = SearchGroupsFilter {
        language: Some(Language::En),
        game_id: Some(GameId::LostArk),
        wow: Some(RegionFilter {
            region: Some(Region::Europe),
        }),
        lost_ark: Some(RegionFilter {
            region: Some(Region::US),
        }),
    };

    let query = coder.encode(&filters).unwrap();
    let decoded = coder
        .decode("game=la&region=US&lang=De", DecodeOptions::default())
        .unwrap();

    println!("Initial filters:\n{filters:#?}");
    println!("Decoded filters:\n{decoded:#?}");
    println!("Query: {query}");
}
