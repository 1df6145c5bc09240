mod common;

use std::thread;

use common::*;
use qmap_engine::model::{
    ConstructorDesc, MemberDesc, ObjectDesc, ObjectValue, Ty, TypeName, Value, ValueError,
};
use qmap_engine::{
    ConfigError, Expr, MapError, Mapper, PairSide, Projection, Queryable, TypeMapping, TypePair,
    UserFn,
};

#[test]
fn maps_person_with_configured_fullname() {
    let mapper = person_mapper();
    let dto: PersonDto = mapper.map(&mert()).unwrap();

    assert_eq!(dto.firstname, "Mert");
    assert_eq!(dto.lastname, "Baykar");
    assert_eq!(dto.age, 26);
    assert_eq!(dto.fullname, "Mert Baykar");
}

#[test]
fn null_collection_elements_are_dropped() {
    let mapper = person_mapper();
    let dto: PersonDto = mapper.map(&mert()).unwrap();

    assert_eq!(
        dto.animals,
        vec![AnimalDto {
            name: "Pamuk".into(),
            age: 0,
        }]
    );
}

#[test]
fn missing_optional_becomes_default() {
    let mapper = person_mapper();
    let person = Person {
        age: None,
        animals: Vec::new(),
        ..mert()
    };
    let dto: PersonDto = mapper.map(&person).unwrap();
    assert_eq!(dto.age, 0);
    assert!(dto.animals.is_empty());
}

#[test]
fn nested_pairs_are_compiled_with_their_parent() {
    let mapper = person_mapper();
    let pair = TypePair::new("Person", "PersonDto");
    mapper.transformation(&pair).unwrap();

    assert!(mapper.is_compiled(&TypePair::new("Animal", "AnimalDto")));
    assert_eq!(mapper.compiled_count(), 2);

    let first = mapper.transformation(&pair).unwrap();
    let second = mapper.transformation(&pair).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn configuring_a_pair_twice_is_rejected() {
    let mut builder = person_builder();
    let err = builder
        .configure::<Person, PersonDto, _>(|_| Ok(()))
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::DuplicateConfiguration {
            source_type: "Person".into(),
            destination_type: "PersonDto".into(),
        }
    );
}

#[test]
fn member_matches_are_validated_when_configured() {
    let mut builder = Mapper::builder();
    let err = builder
        .configure::<Person, PersonDto, _>(|m| {
            m.match_member("Nickname", Expr::text("x"))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownMember { ref member, .. } if member == "Nickname"));

    let err = builder
        .configure::<Person, PersonDto, _>(|m| {
            m.match_member("Fullname", Expr::source().member("Middlename"))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownMember { ref member, .. } if member == "Middlename"));

    builder.register_desc(contact_card()).unwrap();
    let err = builder
        .configure_pair(TypePair::new("Person", "ContactCard"), |m| {
            m.match_member("firstname", Expr::text("x"))?;
            Ok(())
        })
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::NotWritable {
            member: "Firstname".into(),
            type_name: "ContactCard".into(),
        }
    );
}

#[test]
fn later_member_match_replaces_earlier_one() {
    let mut builder = Mapper::builder();
    builder
        .configure::<Person, PersonDto, _>(|m| {
            m.match_member("Fullname", Expr::text("placeholder"))?
                .match_member("FULLNAME", fullname())?;
            Ok(())
        })
        .unwrap();
    let mapper = builder.build();
    let config = mapper
        .configuration(&TypePair::new("Person", "PersonDto"))
        .unwrap();
    assert_eq!(config.matches().len(), 1);

    let dto: PersonDto = mapper.map(&mert()).unwrap();
    assert_eq!(dto.fullname, "Mert Baykar");
}

#[test]
fn inferred_constructor_sets_read_only_members() {
    let mut builder = Mapper::builder();
    builder
        .configure::<Book, BookSummary, _>(|m| {
            m.match_member(
                "AuthorName",
                Expr::source()
                    .member("Author")
                    .member("FirstName")
                    .concat(" ")
                    .concat(Expr::source().member("Author").member("LastName")),
            )?;
            Ok(())
        })
        .unwrap();
    let mapper = builder.build();

    let book = Book {
        title: "Tutunamayanlar".into(),
        author: Some(Author {
            first_name: "Oguz".into(),
            last_name: "Atay".into(),
        }),
        genre: Genre::Novel,
        pages: 724,
    };
    let summary: BookSummary = mapper.map(&book).unwrap();
    assert_eq!(
        summary,
        BookSummary {
            title: "Tutunamayanlar".into(),
            author_name: "Oguz Atay".into(),
            genre: "Novel".into(),
            pages: 724,
        }
    );

    let transformation = mapper
        .transformation(&TypePair::new("Book", "BookSummary"))
        .unwrap();
    assert_eq!(transformation.constructor(), Some("new"));
    let bound: Vec<&str> = transformation
        .bindings()
        .iter()
        .map(|b| b.member.as_str())
        .collect();
    assert_eq!(bound, vec!["AuthorName", "Genre", "Pages"]);
}

#[test]
fn unmatched_constructor_parameter_names_the_parameter() {
    let mut builder = Mapper::builder();
    builder.register::<Book>();
    builder.register_desc(read_book_response()).unwrap();
    let mapper = builder.build();

    let source = Book {
        title: "Kuyucakli Yusuf".into(),
        author: None,
        genre: Genre::Novel,
        pages: 240,
    };
    let err = mapper
        .map_value(&TypePair::new("Book", "ReadBookResponse"), &qmap_engine::model::Reflect::to_value(&source))
        .unwrap_err();
    let MapError::Config(ConfigError::UnmatchedConstructorParameter {
        ref parameter,
        side,
        ..
    }) = err
    else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(parameter, "AuthorName");
    assert_eq!(side, PairSide::Source);
    assert!(err.to_string().contains("AuthorName"));
    assert!(!mapper.is_compiled(&TypePair::new("Book", "ReadBookResponse")));
}

#[test]
fn explicit_constructor_arguments_are_used_as_given() {
    let mut builder = Mapper::builder();
    builder.register::<Person>();
    builder.register_desc(contact_card()).unwrap();
    builder
        .configure_pair(TypePair::new("Person", "ContactCard"), |m| {
            m.using_constructor(Expr::construct(
                "ContactCard",
                "new",
                vec![
                    Expr::source().member("Lastname"),
                    Expr::source().member("Firstname"),
                ],
            ))?
            .match_member("Fullname", fullname())?;
            Ok(())
        })
        .unwrap();
    let mapper = builder.build();

    let person = qmap_engine::model::Reflect::to_value(&mert());
    let card = mapper
        .map_value(&TypePair::new("Person", "ContactCard"), &person)
        .unwrap();
    let card = card.as_object().unwrap();
    assert_eq!(card.get("Firstname"), Some(&Value::from("Baykar")));
    assert_eq!(card.get("Lastname"), Some(&Value::from("Mert")));
    assert_eq!(card.get("Fullname"), Some(&Value::from("Mert Baykar")));
}

#[test]
fn constructor_selected_by_argument_types() {
    let mut builder = Mapper::builder();
    builder.register::<Person>();
    builder.register_desc(contact_card()).unwrap();

    let err = builder
        .configure_pair(TypePair::new("Person", "ContactCard"), |m| {
            m.using_arguments(vec![Expr::int(1)])?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, ConfigError::NoMatchingConstructor { .. }));

    builder
        .configure_pair(TypePair::new("Person", "ContactCard"), |m| {
            m.using_arguments(vec![
                Expr::source().member("Firstname"),
                Expr::source().member("Lastname"),
            ])?;
            Ok(())
        })
        .unwrap();
    let mapper = builder.build();
    let card = mapper
        .map_value(
            &TypePair::new("Person", "ContactCard"),
            &qmap_engine::model::Reflect::to_value(&mert()),
        )
        .unwrap();
    assert_eq!(
        card.as_object().and_then(|c| c.get("Fullname")),
        Some(&Value::from("Mert Baykar"))
    );
}

fn badge_for(configure: impl FnOnce(&mut TypeMapping<'_>) -> Result<(), ConfigError>) -> Value {
    let mut builder = Mapper::builder();
    builder.register::<Person>();
    builder.register_desc(badge()).unwrap();
    builder
        .configure_pair(TypePair::new("Person", "Badge"), configure)
        .unwrap();
    let mapper = builder.build();
    mapper
        .map_value(
            &TypePair::new("Person", "Badge"),
            &qmap_engine::model::Reflect::to_value(&mert()),
        )
        .unwrap()
}

#[test]
fn same_named_overloads_are_told_apart() {
    let by_types = badge_for(|m| {
        m.using_arguments(vec![
            Expr::source().member("Firstname"),
            Expr::source().member("Lastname"),
        ])?;
        Ok(())
    });
    let by_types = by_types.as_object().unwrap();
    assert_eq!(by_types.get("Firstname"), Some(&Value::from("Mert")));
    assert_eq!(by_types.get("Lastname"), Some(&Value::from("Baykar")));

    let by_arity = badge_for(|m| {
        m.using_constructor(Expr::construct(
            "Badge",
            "new",
            vec![
                Expr::source().member("Lastname"),
                Expr::source().member("Firstname"),
            ],
        ))?;
        Ok(())
    });
    let by_arity = by_arity.as_object().unwrap();
    assert_eq!(by_arity.get("Firstname"), Some(&Value::from("Baykar")));
    assert_eq!(by_arity.get("Lastname"), Some(&Value::from("Mert")));

    let single = badge_for(|m| {
        m.using_constructor(Expr::construct(
            "Badge",
            "new",
            vec![Expr::source().member("Firstname")],
        ))?;
        Ok(())
    });
    let single = single.as_object().unwrap();
    assert_eq!(single.get("Firstname"), Some(&Value::from("Mert")));
    assert_eq!(single.get("Lastname"), Some(&Value::from("")));
}

#[test]
fn inferred_constructor_keeps_its_overload() {
    let badge = ObjectDesc::new("Badge")
        .member(MemberDesc::read_only("Firstname", Ty::text()))
        .member(MemberDesc::read_only("Lastname", Ty::text()))
        .constructor(ConstructorDesc::non_public("new").param("Firstname", Ty::text()))
        .constructor(
            ConstructorDesc::public("new")
                .param("Firstname", Ty::text())
                .param("Lastname", Ty::text()),
        );
    let mut builder = Mapper::builder();
    builder.register::<Person>();
    builder.register_desc(badge).unwrap();
    let mapper = builder.build();

    let pair = TypePair::new("Person", "Badge");
    let out = mapper
        .map_value(&pair, &qmap_engine::model::Reflect::to_value(&mert()))
        .unwrap();
    let out = out.as_object().unwrap();
    assert_eq!(out.get("Lastname"), Some(&Value::from("Baykar")));
    assert_eq!(
        mapper.transformation(&pair).unwrap().constructor_args().len(),
        2
    );
}

#[test]
fn only_constructor_invocations_are_accepted() {
    let shout = UserFn::new("shout", Ty::text(), |args: &[Value]| {
        let text = args.first().map(Value::to_text).transpose()?.unwrap_or_default();
        Ok(Value::Text(text.to_uppercase()))
    });
    let mut builder = Mapper::builder();
    builder.register::<Person>();
    builder.register_desc(contact_card()).unwrap();

    let err = builder
        .configure_pair(TypePair::new("Person", "ContactCard"), |m| {
            m.using_constructor(Expr::call(shout, vec![Expr::source().member("Firstname")]))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, ConfigError::NotAConstructor { .. }));

    let err = builder
        .configure_pair(TypePair::new("Person", "ContactCard"), |m| {
            m.using_constructor(Expr::construct("ContactCard", "new", Vec::new()))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, ConfigError::NoMatchingConstructor { .. }));
}

#[test]
fn user_functions_run_inside_matches() {
    let shout = UserFn::new("shout", Ty::text(), |args: &[Value]| {
        let text = args.first().map(Value::to_text).transpose()?.unwrap_or_default();
        Ok(Value::Text(text.to_uppercase()))
    });
    let mut builder = Mapper::builder();
    builder
        .configure::<Person, PersonDto, _>(|m| {
            m.match_member("Lastname", Expr::call(shout, vec![Expr::source().member("Lastname")]))?;
            Ok(())
        })
        .unwrap();
    let dto: PersonDto = builder.build().map(&mert()).unwrap();
    assert_eq!(dto.lastname, "BAYKAR");
    assert_eq!(dto.fullname, "");
}

#[test]
fn text_members_are_parsed_into_numbers() {
    let mut builder = Mapper::builder();
    builder.register::<Stray>().register::<AnimalDto>();
    let mapper = builder.build();
    let pair = TypePair::new("Stray", "AnimalDto");

    let stray = ObjectValue::new("Stray").with("Name", "Tekir").with("Age", " 4 ");
    let dto = mapper.map_value(&pair, &stray.into()).unwrap();
    assert_eq!(dto.as_object().and_then(|o| o.get("Age")), Some(&Value::Int(4)));

    let stray = ObjectValue::new("Stray").with("Name", "Tekir").with("Age", "old");
    let err = mapper.map_value(&pair, &stray.into()).unwrap_err();
    assert!(!err.is_config());
    assert!(matches!(
        err,
        MapError::Value(ValueError::Member { ref member, .. }) if member == "Age"
    ) || matches!(err, MapError::Value(ValueError::Unparsable { .. })));
}

#[test]
fn absent_source_collections_become_empty() {
    let mut builder = Mapper::builder();
    builder
        .register::<Kennel>()
        .register::<KennelList>()
        .register::<KennelArray>()
        .register::<KennelView>();
    let mapper = builder.build();
    let empty = Kennel { animals: None };

    let list: KennelList = mapper.map(&empty).unwrap();
    assert!(list.animals.is_empty());
    let array: KennelArray = mapper.map(&empty).unwrap();
    assert!(array.animals.is_empty());
    let view: KennelView = mapper.map(&empty).unwrap();
    assert!(view.animals.to_vec().unwrap().is_empty());

    let list = mapper
        .map_value(
            &TypePair::new("Kennel", "KennelList"),
            &qmap_engine::model::Reflect::to_value(&empty),
        )
        .unwrap();
    assert_eq!(
        list.as_object().and_then(|o| o.get("Animals")),
        Some(&Value::Seq(Vec::new()))
    );
    let view = mapper
        .map_value(
            &TypePair::new("Kennel", "KennelView"),
            &qmap_engine::model::Reflect::to_value(&empty),
        )
        .unwrap();
    let Some(Value::Lazy(seq)) = view.as_object().and_then(|o| o.get("Animals")) else {
        panic!("expected a lazy sequence");
    };
    assert!(seq.force().unwrap().is_empty());

    let stocked = Kennel {
        animals: Some(vec![Animal {
            name: "Pamuk".into(),
            age: 4,
        }]),
    };
    let array: KennelArray = mapper.map(&stocked).unwrap();
    assert_eq!(
        &*array.animals,
        [AnimalDto {
            name: "Pamuk".into(),
            age: 4,
        }]
    );
}

#[test]
fn lazy_destinations_defer_element_mapping() {
    let mut builder = Mapper::builder();
    builder.register::<Shelter>().register::<ShelterView>();
    let mapper = builder.build();

    let shelter = Shelter {
        strays: vec![
            Some(Stray {
                name: "Tekir".into(),
                age: "3".into(),
            }),
            None,
            Some(Stray {
                name: "Duman".into(),
                age: "unknown".into(),
            }),
        ],
    };
    let view: ShelterView = mapper.map(&shelter).unwrap();

    let mut strays = view.strays.iter();
    let first = strays.next().unwrap().unwrap();
    assert_eq!(
        first,
        AnimalDto {
            name: "Tekir".into(),
            age: 3,
        }
    );
    assert!(strays.next().unwrap().is_err());
    assert!(strays.next().is_none());
}

#[test]
fn map_all_and_map_iter_keep_order() {
    let mapper = person_mapper();
    let people: Vec<Person> = ["Ada", "Grace", "Edsger"]
        .iter()
        .map(|name| Person {
            firstname: (*name).to_string(),
            ..mert()
        })
        .collect();

    let eager: Vec<PersonDto> = mapper.map_all(&people).unwrap();
    let names: Vec<&str> = eager.iter().map(|dto| dto.firstname.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Grace", "Edsger"]);

    let lazy: Vec<PersonDto> = mapper
        .map_iter::<Person, PersonDto, _>(people)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(lazy, eager);
}

#[test]
fn null_source_maps_to_null() {
    let mapper = person_mapper();
    let out = mapper
        .map_value(&TypePair::new("Person", "PersonDto"), &Value::Null)
        .unwrap();
    assert!(out.is_null());
}

#[test]
fn unknown_pairs_report_configuration_errors() {
    let mapper = person_mapper();
    let err = mapper
        .map_value(&TypePair::new("Person", "Nobody"), &Value::Null)
        .unwrap_err();
    assert!(err.is_config());
    assert!(matches!(
        err,
        MapError::Config(ConfigError::UnknownType { ref type_name }) if type_name == "Nobody"
    ));
}

struct RecordingQuery {
    element: &'static str,
}

impl Queryable for RecordingQuery {
    type Output = Projection;

    fn element_type(&self) -> TypeName {
        TypeName::new(self.element)
    }

    fn select(self, projection: Projection) -> Projection {
        projection
    }
}

fn contains_invoke(expr: &Expr) -> bool {
    matches!(expr, Expr::Invoke { .. }) || expr.children().into_iter().any(contains_invoke)
}

#[test]
fn queries_receive_self_contained_projections() {
    let mapper = person_mapper();
    let projection = mapper
        .map_query::<PersonDto, _>(RecordingQuery { element: "Person" })
        .unwrap();

    assert_eq!(projection.source_type(), Ty::object("Person"));
    assert_eq!(projection.result_type(), Ty::object("PersonDto"));
    assert!(!contains_invoke(projection.body()));

    let typed = mapper.project::<Person, PersonDto>().unwrap();
    assert_eq!(typed, projection);
}

#[test]
fn concurrent_first_use_compiles_once() {
    let mapper = person_mapper();
    let person = mert();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| mapper.map::<Person, PersonDto>(&person)))
            .collect();
        for handle in handles {
            let dto = handle.join().unwrap().unwrap();
            assert_eq!(dto.fullname, "Mert Baykar");
        }
    });
    assert_eq!(mapper.compiled_count(), 2);
}
