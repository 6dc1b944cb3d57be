//! Passwort-Hashing mit Argon2id
//!
//! Hashes werden als PHC-String gespeichert; Algorithmus, Parameter und Salt
//! stehen darin, daher lassen sich auch Hashes mit aelteren Kosten pruefen.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{AuthError, AuthResult};

/// Argon2id-Kosten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashKosten {
    /// Speicher in KiB
    pub speicher_kib: u32,
    pub iterationen: u32,
    pub parallelitaet: u32,
}

impl Default for HashKosten {
    /// OWASP-Empfehlung: 64 MiB, 3 Iterationen, 1 Thread
    fn default() -> Self {
        Self {
            speicher_kib: 64 * 1024,
            iterationen: 3,
            parallelitaet: 1,
        }
    }
}

impl HashKosten {
    /// Minimale Kosten, nur fuer Tests
    pub fn minimal() -> Self {
        Self {
            speicher_kib: Params::MIN_M_COST,
            iterationen: 1,
            parallelitaet: 1,
        }
    }

    fn argon2(self) -> AuthResult<Argon2<'static>> {
        let params = Params::new(self.speicher_kib, self.iterationen, self.parallelitaet, None)
            .map_err(|e| AuthError::PasswortHashing(format!("Argon2-Parameter ungueltig: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hasht ein Passwort mit zufaelligem Salt
pub fn passwort_hashen(passwort: &str, kosten: HashKosten) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    kosten
        .argon2()?
        .hash_password(passwort.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswortHashing(e.to_string()))
}

/// Prueft ein Passwort gegen einen gespeicherten PHC-Hash
pub fn passwort_verifizieren(passwort: &str, hash: &str) -> AuthResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

    // Parameter stammen aus dem Hash selbst
    match Argon2::default().verify_password(passwort.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwort_hashen_und_verifizieren() {
        let passwort = "sicheres_passwort_123!";
        let hash = passwort_hashen(passwort, HashKosten::minimal()).expect("Hashing fehlgeschlagen");

        assert!(
            hash.starts_with("$argon2id$"),
            "Hash muss mit $argon2id$ beginnen"
        );
        assert!(passwort_verifizieren(passwort, &hash).unwrap());
        assert!(!passwort_verifizieren("falsches_passwort", &hash).unwrap());
    }

    #[test]
    fn standard_kosten_im_hash() {
        let hash = passwort_hashen("pw", HashKosten::default()).unwrap();
        assert!(hash.contains("m=65536,t=3,p=1"), "Hash: {hash}");
        assert!(passwort_verifizieren("pw", &hash).unwrap());
    }

    #[test]
    fn gleiche_passwoerter_unterschiedliche_hashes() {
        let kosten = HashKosten::minimal();
        let hash1 = passwort_hashen("gleich", kosten).unwrap();
        let hash2 = passwort_hashen("gleich", kosten).unwrap();
        assert_ne!(hash1, hash2, "Salt muss sich unterscheiden");
    }

    #[test]
    fn ungueltige_parameter() {
        let kosten = HashKosten {
            speicher_kib: 1,
            ..HashKosten::minimal()
        };
        assert!(matches!(
            passwort_hashen("pw", kosten),
            Err(AuthError::PasswortHashing(_))
        ));
    }

    #[test]
    fn ungueltiges_hash_format_gibt_fehler() {
        assert!(passwort_verifizieren("passwort", "kein_gueltiger_hash").is_err());
    }
}
