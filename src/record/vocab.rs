//! Closed vocabularies used by the intake record.
//!
//! Each vocabulary serializes to the lowercase wire value the backend stores
//! and carries the Portuguese label shown in the terminal.

/// A closed set of values selectable from a list.
pub trait Vocabulary: Copy + PartialEq + 'static {
    /// Every value, in display order
    fn all() -> &'static [Self];
    /// Value as stored by the backend
    fn wire(&self) -> &'static str;
    /// Human label
    fn label(&self) -> &'static str;

    /// Position of this value in [`Vocabulary::all`]
    fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    /// Value at `index`, falling back to the first one
    fn from_index(index: usize) -> Self {
        let all = Self::all();
        all.get(index).copied().unwrap_or(all[0])
    }

    /// Labels of every value, in display order
    fn labels() -> Vec<String> {
        Self::all().iter().map(|v| v.label().to_string()).collect()
    }
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($wire:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Stored value outside this vocabulary; never offered for selection
            Desconhecido,
        }

        impl $name {
            /// Value for a backend wire string, if it is part of the vocabulary
            pub fn from_wire(wire: &str) -> Option<Self> {
                match wire {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl Vocabulary for $name {
            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn wire(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Desconhecido => "",
                }
            }

            fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Desconhecido => "Não informado",
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.wire())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <Option<String> as serde::Deserialize>::deserialize(deserializer)?
                    .unwrap_or_default();
                Ok($name::from_wire(&raw).unwrap_or_else(|| {
                    tracing::debug!(value = %raw, vocabulary = stringify!($name), "Unknown vocabulary value");
                    $name::Desconhecido
                }))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.wire())
            }
        }
    };
}

vocabulary! {
    /// Smoking status
    StatusTabagismo {
        #[default]
        Nunca => ("nunca", "Nunca fumou"),
        Ex => ("ex", "Ex-fumante"),
        Atual => ("atual", "Fumante atual"),
    }
}

vocabulary! {
    SexoBiologico {
        #[default]
        Masculino => ("masculino", "Masculino"),
        Feminino => ("feminino", "Feminino"),
    }
}

vocabulary! {
    /// Unit for the patient's age
    UnidadeIdade {
        Dias => ("dias", "Dias"),
        Meses => ("meses", "Meses"),
        #[default]
        Anos => ("anos", "Anos"),
    }
}

vocabulary! {
    /// Unit for how long ago the chief complaint started
    UnidadeTempo {
        Horas => ("horas", "Horas"),
        #[default]
        Dias => ("dias", "Dias"),
        Semanas => ("semanas", "Semanas"),
        Meses => ("meses", "Meses"),
        Anos => ("anos", "Anos"),
    }
}

vocabulary! {
    CorEtnia {
        #[default]
        Branca => ("branca", "Branca"),
        Parda => ("parda", "Parda"),
        Preta => ("preta", "Preta"),
        Indigena => ("indigena", "Indígena"),
        Asiatica => ("asiatica", "Asiática"),
        Outra => ("outra", "Outra"),
    }
}

vocabulary! {
    EstadoCivil {
        #[default]
        Solteiro => ("solteiro", "Solteiro(a)"),
        Casado => ("casado", "Casado(a)"),
        Divorciado => ("divorciado", "Divorciado(a)"),
        Viuvo => ("viuvo", "Viúvo(a)"),
        UniaoEstavel => ("uniao_estavel", "União Estável"),
    }
}

vocabulary! {
    /// How reliable the informant's account is judged to be
    GrauConfiabilidade {
        Otimo => ("otimo", "Ótimo"),
        #[default]
        Bom => ("bom", "Bom"),
        Regular => ("regular", "Regular"),
        Ruim => ("ruim", "Ruim"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_match_backend() {
        assert_eq!(
            serde_json::to_string(&EstadoCivil::UniaoEstavel).unwrap(),
            "\"uniao_estavel\""
        );
        assert_eq!(
            serde_json::from_str::<StatusTabagismo>("\"atual\"").unwrap(),
            StatusTabagismo::Atual
        );
    }

    #[test]
    fn test_defaults_match_initial_skeleton() {
        assert_eq!(StatusTabagismo::default(), StatusTabagismo::Nunca);
        assert_eq!(UnidadeIdade::default(), UnidadeIdade::Anos);
        assert_eq!(UnidadeTempo::default(), UnidadeTempo::Dias);
        assert_eq!(GrauConfiabilidade::default(), GrauConfiabilidade::Bom);
    }

    #[test]
    fn test_index_round_trip() {
        for value in CorEtnia::all() {
            assert_eq!(CorEtnia::from_index(value.index()), *value);
        }
        assert_eq!(CorEtnia::from_index(99), CorEtnia::Branca);
    }

    #[test]
    fn test_unknown_wire_value_is_kept_out_of_the_list() {
        let sexo: SexoBiologico = serde_json::from_str("\"intersexo\"").unwrap();
        assert_eq!(sexo, SexoBiologico::Desconhecido);
        assert_eq!(sexo.label(), "Não informado");
        assert!(!SexoBiologico::all().contains(&SexoBiologico::Desconhecido));

        let empty: EstadoCivil = serde_json::from_str("null").unwrap();
        assert_eq!(empty, EstadoCivil::Desconhecido);
    }

    #[test]
    fn test_labels_in_display_order() {
        assert_eq!(
            GrauConfiabilidade::labels(),
            vec!["Ótimo", "Bom", "Regular", "Ruim"]
        );
    }
}
