//! End-to-end runs of the sample mappings.

use qmap_cli::json::value_from_json;
use qmap_cli::samples::{self, AnimalDto, Person, PersonDto, ReadBookResponse};
use qmap_engine::TypePair;
use qmap_model::Reflect;

#[test]
fn people_use_the_explicit_constructor() {
    let mapper = samples::mapper().unwrap();
    let dtos: Vec<PersonDto> = mapper.map_all(&samples::people()).unwrap();

    assert_eq!(
        dtos[0],
        PersonDto {
            firstname: "Mert".into(),
            lastname: "Baykar".into(),
            age: 26,
            fullname: "Mert Baykar".into(),
            animals: vec![AnimalDto {
                name: "Pamuk".into(),
                age: 0,
            }],
        }
    );
    assert_eq!(dtos[1].age, 0);

    let transformation = mapper
        .transformation(&TypePair::new("Person", "PersonDto"))
        .unwrap();
    assert_eq!(transformation.constructor(), Some("new"));
    assert_eq!(transformation.constructor_args().len(), 2);
}

#[test]
fn books_serialize_as_json() {
    let mapper = samples::mapper().unwrap();
    let pair = TypePair::new("Book", "ReadBookResponse");
    let sources: Vec<_> = samples::books().iter().map(Reflect::to_value).collect();
    let mapped = mapper.map_values(&pair, &sources).unwrap();

    insta::assert_json_snapshot!(mapped, @r#"
    [
      {
        "Title": "Tutunamayanlar",
        "AuthorName": "Oguz Atay",
        "Genre": "Novel",
        "Tags": [
          "classic",
          "modernist"
        ]
      },
      {
        "Title": "Anonymous Verses",
        "AuthorName": " ",
        "Genre": "Poetry",
        "Tags": []
      }
    ]
    "#);

    let typed: Vec<ReadBookResponse> = mapper.map_all(&samples::books()).unwrap();
    assert_eq!(typed[0].tags.len(), 2);
}

#[test]
fn json_input_maps_like_typed_input() {
    let mapper = samples::mapper().unwrap();
    let json = serde_json::json!({
        "Firstname": "Mert",
        "Lastname": "Baykar",
        "Age": 26.3,
        "Animals": [{ "Name": "Pamuk" }, null]
    });
    let source = value_from_json(&json, &Person::ty(), mapper.catalog()).unwrap();
    let from_json = mapper
        .map_value(&TypePair::new("Person", "PersonDto"), &source)
        .unwrap();
    let from_typed: PersonDto = mapper.map(&samples::people()[0]).unwrap();

    assert_eq!(PersonDto::from_value(from_json).unwrap(), from_typed);
}
