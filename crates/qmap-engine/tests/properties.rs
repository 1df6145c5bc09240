mod common;

use common::*;
use proptest::prelude::*;
use qmap_engine::TypePair;

fn animal() -> impl Strategy<Value = Option<Animal>> {
    proptest::option::of(("[a-z]{1,8}", 0..30i32).prop_map(|(name, age)| Animal { name, age }))
}

fn person() -> impl Strategy<Value = Person> {
    (
        "[A-Z][a-z]{0,6}",
        "[A-Z][a-z]{0,6}",
        proptest::option::of(0.0..120.0f64),
        proptest::collection::vec(animal(), 0..12),
    )
        .prop_map(|(firstname, lastname, age, animals)| Person {
            firstname,
            lastname,
            age,
            animals,
        })
}

proptest! {
    #[test]
    fn animals_keep_order_and_drop_nulls(person in person()) {
        let mapper = person_mapper();
        let dto: PersonDto = mapper.map(&person).unwrap();

        let expected: Vec<(String, i32)> = person
            .animals
            .iter()
            .flatten()
            .map(|a| (a.name.clone(), a.age))
            .collect();
        let actual: Vec<(String, i32)> = dto
            .animals
            .iter()
            .map(|a| (a.name.clone(), a.age))
            .collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(dto.fullname, format!("{} {}", person.firstname, person.lastname));
        prop_assert_eq!(dto.age, person.age.map_or(0, |age| age as i32));
    }

    #[test]
    fn map_all_preserves_length(people in proptest::collection::vec(person(), 0..8)) {
        let mapper = person_mapper();
        let dtos: Vec<PersonDto> = mapper.map_all(&people).unwrap();
        prop_assert_eq!(dtos.len(), people.len());
        for (dto, person) in dtos.iter().zip(&people) {
            prop_assert_eq!(&dto.firstname, &person.firstname);
        }
    }

    #[test]
    fn repeated_mapping_is_stable(person in person()) {
        let mapper = person_mapper();
        let first: PersonDto = mapper.map(&person).unwrap();
        let compiled = mapper.compiled_count();
        let second: PersonDto = mapper.map(&person).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(mapper.compiled_count(), compiled);
        prop_assert!(mapper.is_compiled(&TypePair::new("Person", "PersonDto")));
    }
}

proptest! {
    #[test]
    fn same_named_members_copy_through(animal in ("[A-Za-z ]{0,12}", any::<i32>())) {
        let (name, age) = animal;
        let mapper = person_mapper();
        let dto: AnimalDto = mapper.map(&Animal { name: name.clone(), age }).unwrap();
        prop_assert_eq!(dto, AnimalDto { name, age });
    }

    #[test]
    fn unmatched_members_hold_defaults(person in person()) {
        let mut builder = qmap_engine::Mapper::builder();
        builder.register::<Person>().register::<PersonDto>();
        let dto: PersonDto = builder.build().map(&person).unwrap();
        prop_assert_eq!(dto.fullname, "");
        prop_assert_eq!(dto.firstname, person.firstname);
    }
}
