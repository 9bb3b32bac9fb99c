use query_coder::{Coder, Config, DecodeOptions, DecodeType, FieldHandler, Schema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Post {
    title: Option<String>,
    tags: Option<Vec<String>>,
    ids: Option<Vec<u32>>,
    draft: Option<bool>,
}

fn main() {
    let schema = || {
        Schema::new()
            .field("title", FieldHandler::new("title"))
            .field("tags", FieldHandler::new("tags").decode_type(DecodeType::Array))
            .field(
                "ids",
                FieldHandler::new("ids")
                    .decode_type(DecodeType::Array)
                    .array_separator("|"),
            )
            .field(
                "draft",
                FieldHandler::new("draft")
                    .decode_type(DecodeType::Boolean)
                    .accept_empty_value(true),
            )
    };

    let post = Post {
        title: Some("Carrot City weekly".to_string()),
        tags: Some(vec!["news".to_string(), "local".to_string()]),
        ids: Some(vec![3, 14, 15]),
        draft: Some(false),
    };

    let coder = Coder::<Post>::new(schema()).unwrap();
    let query = coder.encode(&post).unwrap();
    println!("Query: {query}");

    let form = Coder::<Post>::with_config(
        schema(),
        Config::new()
            .use_form_encoding(true)
            .leading_question_mark(true),
    )
    .unwrap();
    println!("Form query: {}", form.encode(&post).unwrap());

    // ids decode as strings, so read them back as an untyped value
    let decoded = coder.decode_value(query.as_str(), Default::default());
    println!("Decoded value: {decoded:#?}");

    let titled: Post = Coder::<Post>::new(Schema::new().field("title", FieldHandler::new("title")))
        .unwrap()
        .decode("title=Hello+World", DecodeOptions::default())
        .unwrap();
    println!("Decoded post: {titled:#?}");
}
